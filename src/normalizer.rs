//! Free-text normalization
//!
//! Lowercases input and reduces it to `[a-z0-9 -]` with single spaces.
//! Hyphens survive because some symptom names are hyphenated.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DISALLOWED: Regex = Regex::new(r"[^a-z0-9\s\-]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Normalize user text for symptom matching. Total over all input.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let restricted = DISALLOWED.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&restricted, " ").trim().to_string()
}
