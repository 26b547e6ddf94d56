//! Sectioned search suggestions.
//!
//! The search dropdown renders the autocomplete groups one after another
//! (items, areas, containers, bins, tags) while the keyboard cursor is a
//! single flat index. [`SectionedSuggestions`] maps between the two.

use crate::location::Autocomplete;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Section {
    Items,
    Areas,
    Containers,
    Bins,
    Tags,
}

impl Section {
    /// Render order of the dropdown.
    pub const ORDER: [Section; 5] = [
        Section::Items,
        Section::Areas,
        Section::Containers,
        Section::Bins,
        Section::Tags,
    ];
}

/// What committing a suggestion does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionAction {
    /// Replace the search box text.
    SetQuery(String),
    /// Navigate the client to this path.
    Navigate(String),
}

/// One resolved dropdown entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    pub section: Section,
    pub offset: usize,
    pub value: &'a str,
}

impl Entry<'_> {
    pub fn action(&self) -> SuggestionAction {
        let base = match self.section {
            Section::Items => return SuggestionAction::SetQuery(self.value.to_string()),
            Section::Areas => "/areas/",
            Section::Containers => "/containers/",
            Section::Bins => "/bins/",
            Section::Tags => "/tags/",
        };
        SuggestionAction::Navigate(format!("{base}{}", self.value))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SectionedSuggestions<'a> {
    data: &'a Autocomplete,
}

impl<'a> SectionedSuggestions<'a> {
    pub fn new(data: &'a Autocomplete) -> Self {
        Self { data }
    }

    fn section(&self, section: Section) -> &'a [String] {
        match section {
            Section::Items => &self.data.items,
            Section::Areas => &self.data.areas,
            Section::Containers => &self.data.containers,
            Section::Bins => &self.data.bins,
            Section::Tags => &self.data.tags,
        }
    }

    /// Total number of entries across all sections.
    pub fn len(&self) -> usize {
        Section::ORDER.iter().map(|s| self.section(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of the first entry of `section`.
    pub fn section_start(&self, section: Section) -> usize {
        Section::ORDER
            .iter()
            .take_while(|s| **s != section)
            .map(|s| self.section(*s).len())
            .sum()
    }

    /// Resolve a flat index to its section entry.
    pub fn resolve(&self, index: usize) -> Option<Entry<'a>> {
        let mut start = 0;
        for section in Section::ORDER {
            let values = self.section(section);
            if index < start + values.len() {
                let offset = index - start;
                return Some(Entry {
                    section,
                    offset,
                    value: values[offset].as_str(),
                });
            }
            start += values.len();
        }
        None
    }

    pub fn commit(&self, index: usize) -> Option<SuggestionAction> {
        self.resolve(index).map(|e| e.action())
    }

    /// Entries in render order.
    pub fn iter(&self) -> impl Iterator<Item = Entry<'a>> + 'a {
        let data = *self;
        Section::ORDER.into_iter().flat_map(move |section| {
            data.section(section)
                .iter()
                .enumerate()
                .map(move |(offset, value)| Entry {
                    section,
                    offset,
                    value: value.as_str(),
                })
        })
    }
}

/// Route for submitting the raw search text; `None` when it is blank.
pub fn submit_query(raw: &str) -> Option<String> {
    let query = raw.trim();
    if query.is_empty() {
        return None;
    }
    Some(format!("/?search={}", encode_component(query)))
}

/// Percent-encode like `encodeURIComponent`.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
