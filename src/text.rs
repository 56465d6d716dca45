//! Whitespace normalization shared by every text comparison.

/// Collapse every whitespace run to a single ASCII space and trim both ends.
///
/// All comparisons in the crate go through this function; raw page text is
/// never compared directly.
pub fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized, lower-cased form used for case-insensitive matching.
pub fn fold(value: &str) -> String {
    normalize(value).to_lowercase()
}

/// Length in characters, which is what the length bounds are expressed in.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}
