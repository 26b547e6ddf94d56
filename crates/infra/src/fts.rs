//! Turning user text into safe FTS5 and LIKE expressions.
//!
//! User input is never passed to `MATCH` verbatim: FTS5 has its own query
//! syntax (`AND`, `NEAR`, `*`, column filters, quotes) and a stray quote or
//! operator is a hard SQL error.

/// Every whitespace-separated term as a quoted phrase; terms are implicitly
/// AND-ed. `None` when the input has no terms.
pub fn match_all_terms(raw: &str) -> Option<String> {
    let terms: Vec<String> = raw.split_whitespace().map(quote).collect();
    if terms.is_empty() {
        return None;
    }
    Some(terms.join(" "))
}

/// Like [`match_all_terms`] but every term is a prefix query, for
/// suggest-as-you-type.
pub fn match_prefixes(raw: &str) -> Option<String> {
    let terms: Vec<String> = raw
        .split_whitespace()
        .map(|t| format!("{}*", quote(t)))
        .collect();
    if terms.is_empty() {
        return None;
    }
    Some(terms.join(" "))
}

/// `%raw%` with LIKE wildcards escaped; use with `ESCAPE '\'`.
pub fn like_contains(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('%');
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

fn quote(term: &str) -> String {
    format!("\"{}\"", term.replace('"', "\"\""))
}
