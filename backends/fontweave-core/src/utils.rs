// this_file: backends/fontweave-core/src/utils.rs

//! Utility functions for the fontweave engine.

use crate::types::{FontId, LanguageId};

/// Compare two identity signatures (file name or font name)
pub fn signatures_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

/// Base id for a clone forked from `ancestor` for `language`
pub fn derived_font_id(ancestor: &FontId, language: &LanguageId) -> String {
    format!("{ancestor}@{language}")
}

/// Family alias a renderer registers a stack font under.
///
/// Aliases must be valid unquoted CSS identifiers, so anything outside
/// `[A-Za-z0-9_-]` becomes `-`.
pub fn family_alias(style: &str, font: &FontId) -> String {
    let raw = format!("{style}-{font}");
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
