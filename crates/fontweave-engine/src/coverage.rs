// this_file: crates/fontweave-engine/src/coverage.rs

//! Per-character font selection along a language's fallback stack.

use crate::stack::{build_stack, primary_for};
use fontweave_core::{FontId, LanguageId, StackEntry, Style};

/// Which font renders a character
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverageHit {
    /// The language's primary font (override or global)
    Primary(FontId),
    /// A stack font, with its position in the stack
    Fallback { font: FontId, position: usize },
    /// Nothing in the style covers it; the system font is trusted to
    System,
}

/// Try the language's primary font, then each stack entry in order.
pub fn font_for_char(style: &Style, language: &LanguageId, ch: char) -> CoverageHit {
    if let Some(primary) = primary_for(style, language) {
        if primary.glyphs.covers(ch) {
            return CoverageHit::Primary(primary.id.clone());
        }
    }
    walk_stack(&build_stack(style, language), ch)
}

/// Walk an already built stack.
pub fn walk_stack(stack: &[StackEntry], ch: char) -> CoverageHit {
    stack
        .iter()
        .enumerate()
        .find(|(_, entry)| entry.glyphs.covers(ch))
        .and_then(|(position, entry)| {
            entry.font.as_ref().map(|font| CoverageHit::Fallback {
                font: font.clone(),
                position,
            })
        })
        .unwrap_or(CoverageHit::System)
}

/// Split `text` into runs of characters rendered by the same font.
pub fn segment_by_coverage(
    style: &Style,
    language: &LanguageId,
    text: &str,
) -> Vec<(CoverageHit, String)> {
    let stack = build_stack(style, language);
    let primary = primary_for(style, language);

    let mut runs: Vec<(CoverageHit, String)> = Vec::new();
    for ch in text.chars() {
        let hit = match primary {
            Some(primary) if primary.glyphs.covers(ch) => CoverageHit::Primary(primary.id.clone()),
            _ => walk_stack(&stack, ch),
        };
        match runs.last_mut() {
            Some((last, run)) if *last == hit => run.push(ch),
            _ => runs.push((hit, ch.to_string())),
        }
    }
    runs
}
