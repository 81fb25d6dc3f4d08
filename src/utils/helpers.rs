//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

/// Normalize a free-text search term; blank input means "no filter"
pub fn normalize_search_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Case-insensitive substring match against any of the given fields.
/// `term` must already be lowercased.
pub fn matches_any(fields: &[&str], term: &str) -> bool {
    fields.iter().any(|field| field.to_lowercase().contains(term))
}

/// Escape `%`, `_` and `\` so a term can be embedded in an `ILIKE` pattern
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
