//! Flat search vocabulary for the server-rendered search box.

use std::collections::BTreeSet;

use crate::location::LocationNames;

/// Shortest description word worth suggesting.
pub const MIN_WORD_CHARS: usize = 4;

/// Build the suggestion list from `(name, description)` pairs and the
/// location names in use.
///
/// Item names are taken whole; descriptions contribute their
/// whitespace-separated words of at least [`MIN_WORD_CHARS`] characters.
/// The result is deduplicated and sorted.
pub fn search_vocabulary<N, D>(items: &[(N, Option<D>)], locations: &LocationNames) -> Vec<String>
where
    N: AsRef<str>,
    D: AsRef<str>,
{
    let mut words = BTreeSet::new();

    for (name, description) in items {
        words.insert(name.as_ref().to_string());
        if let Some(description) = description {
            words.extend(
                description
                    .as_ref()
                    .split_whitespace()
                    .filter(|w| w.chars().count() >= MIN_WORD_CHARS)
                    .map(str::to_string),
            );
        }
    }

    words.extend(
        locations
            .areas
            .iter()
            .chain(&locations.containers)
            .chain(&locations.bins)
            .filter(|l| !l.is_empty())
            .cloned(),
    );

    words.into_iter().collect()
}
