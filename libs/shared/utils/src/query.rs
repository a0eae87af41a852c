//! Helpers for building PostgREST filter strings.

/// Lower-cased, trimmed search input with the characters that carry meaning
/// inside an `or=(...)` filter removed.
pub fn search_term(query: &str) -> String {
    query
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '"' | '\\'))
        .collect()
}

/// Comma-separated ids for an `in.(...)` filter.
pub fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",")
}
