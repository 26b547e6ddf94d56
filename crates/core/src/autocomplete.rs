//! Substring autocomplete shared by every suggestion box.
//!
//! Matching is case-insensitive, keeps the candidates' order and caps the
//! result count. Blank candidates never appear in results.

/// Number of suggestions the input widgets show.
pub const DEFAULT_LIMIT: usize = 10;

/// Filter `candidates` down to those containing `query`, case-insensitively.
///
/// An empty query matches nothing.
pub fn filter<'a, S: AsRef<str>>(query: &str, candidates: &'a [S], limit: usize) -> Vec<&'a str> {
    SuggestionFilter::new(Some(limit), false).suggestions(query, candidates)
}

/// Filtering policy for one suggestion box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionFilter {
    limit: Option<usize>,
    show_all_when_empty: bool,
}

impl SuggestionFilter {
    pub fn new(limit: Option<usize>, show_all_when_empty: bool) -> Self {
        Self {
            limit,
            show_all_when_empty,
        }
    }

    /// Tag / area / container / bin inputs: top 10, and the first 10
    /// candidates when the box is opened with nothing typed.
    pub fn input_widget() -> Self {
        Self::new(Some(DEFAULT_LIMIT), true)
    }

    /// Server-rendered pages: uncapped, nothing until the user types.
    pub fn legacy_script() -> Self {
        Self::new(None, false)
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn suggestions<'a, S: AsRef<str>>(&self, query: &str, candidates: &'a [S]) -> Vec<&'a str> {
        let cap = self.limit.unwrap_or(usize::MAX);
        let non_blank = candidates
            .iter()
            .map(AsRef::as_ref)
            .filter(|c| !c.is_empty());

        if query.is_empty() {
            if !self.show_all_when_empty {
                return Vec::new();
            }
            return non_blank.take(cap).collect();
        }

        let needle = query.to_lowercase();
        non_blank
            .filter(|c| c.to_lowercase().contains(&needle))
            .take(cap)
            .collect()
    }
}

/// A candidate split around the first match of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub before: &'a str,
    pub matched: &'a str,
    pub after: &'a str,
}

/// Locate the first case-insensitive occurrence of `query` in `candidate`.
///
/// The returned slices borrow from `candidate`, so the matched part keeps the
/// candidate's own casing.
pub fn highlight<'a>(candidate: &'a str, query: &str) -> Option<Highlight<'a>> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return None;
    }

    for (start, _) in candidate.char_indices() {
        let mut folded = String::new();
        for (offset, ch) in candidate[start..].char_indices() {
            folded.extend(ch.to_lowercase());
            if !needle.starts_with(folded.as_str()) {
                break;
            }
            if folded.len() == needle.len() {
                let end = start + offset + ch.len_utf8();
                return Some(Highlight {
                    before: &candidate[..start],
                    matched: &candidate[start..end],
                    after: &candidate[end..],
                });
            }
        }
    }

    None
}
