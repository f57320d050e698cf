//! Text normalization for prediction/ground-truth comparison

/// Normalize text for comparison: lowercase, trim, collapse interior
/// whitespace runs to a single space.
///
/// Idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
