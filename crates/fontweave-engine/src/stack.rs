// this_file: crates/fontweave-engine/src/stack.rs

//! Fallback stack assembly.
//!
//! A language's stack lists its specifically mapped fonts first, then the
//! general fallbacks nobody claimed, then the system sentinel. Glyph
//! coverage walks must follow this order.

use crate::legacy;
use crate::resolve::{resolve_font, system_fallback_family, system_fallback_settings};
use fontweave_core::utils::{family_alias, signatures_match};
use fontweave_core::{
    FallbackLink, FallbackOverride, Font, FontId, FontScope, GlyphHandle, LanguageId,
    StackDiagnostics, StackEntry, Style,
};
use std::collections::BTreeSet;

/// Font ids any language maps to directly. Soft links, legacy self-links
/// included, claim nothing.
pub fn claimed_fonts(style: &Style) -> BTreeSet<FontId> {
    let mut claimed: BTreeSet<FontId> = style.primary_font_overrides.values().cloned().collect();
    for fallback in style.fallback_font_overrides.values() {
        match fallback {
            FallbackOverride::Single(id) => {
                claimed.insert(id.clone());
            }
            FallbackOverride::Map(links) => {
                for (key, link) in links {
                    if let FallbackLink::Font(id) = link {
                        if !legacy::is_self_link(style, key, link) {
                            claimed.insert(id.clone());
                        }
                    }
                }
            }
        }
    }
    claimed
}

/// The font rendering `language` starts with: its primary override if it
/// has a live one, otherwise the global primary.
pub fn primary_for<'a>(style: &'a Style, language: &LanguageId) -> Option<&'a Font> {
    style
        .primary_font_overrides
        .get(language)
        .and_then(|id| style.font(id.as_str()))
        .or_else(|| style.primary_font())
}

/// Build the ordered fallback stack for `language`, ending in the system sentinel.
///
/// Nested-map entries are listed in the global position of their key font,
/// since the map itself is ordered by id. Fonts sharing the global primary's
/// identity signature never enter the general pool, mapped language or not;
/// a language reaches such a font only through an explicit mapping.
pub fn build_stack(style: &Style, language: &LanguageId) -> Vec<StackEntry> {
    let claimed = claimed_fonts(style);
    let primary_signature = style.primary_font().map(|font| font.signature().to_string());

    let mut builder = StackBuilder {
        style,
        entries: Vec::new(),
        included: BTreeSet::new(),
    };
    // Originals this language replaced stay out of the general pool.
    let mut substituted = BTreeSet::new();

    match style.fallback_font_overrides.get(language) {
        Some(FallbackOverride::Single(id)) => builder.push(id),
        Some(FallbackOverride::Map(links)) => {
            let mut ordered: Vec<_> = links.iter().collect();
            ordered.sort_by_key(|(key, _)| style.font_index(key.as_str()).unwrap_or(usize::MAX));
            for (key, link) in ordered {
                substituted.insert(key.clone());
                match link {
                    FallbackLink::Soft => builder.push(key),
                    FallbackLink::Font(id) => builder.push(id),
                }
            }
        }
        None => {}
    }

    let general: Vec<&Font> = style
        .fallback_fonts()
        .filter(|font| font.scope == FontScope::Global && !font.is_clone())
        .filter(|font| !claimed.contains(&font.id) && !substituted.contains(&font.id))
        .filter(|font| {
            primary_signature
                .as_deref()
                .map_or(true, |signature| !font.same_signature(signature))
        })
        .collect();
    for font in general {
        builder.push(&font.id);
    }

    let entries = builder.finish(language);
    StackDiagnostics::new(&style.name, language, &entries).log();
    entries
}

struct StackBuilder<'a> {
    style: &'a Style,
    entries: Vec<StackEntry>,
    included: BTreeSet<FontId>,
}

impl StackBuilder<'_> {
    /// Append a font unless it is missing, hidden or already listed.
    fn push(&mut self, id: &FontId) {
        if self.included.contains(id) {
            return;
        }
        let Some(font) = self.style.font(id.as_str()) else {
            return;
        };
        let settings = resolve_font(self.style, font);
        if settings.hidden {
            return;
        }
        self.included.insert(id.clone());
        self.entries.push(StackEntry {
            font: Some(id.clone()),
            family_alias: family_alias(&self.style.name, id),
            glyphs: font.glyphs.clone(),
            settings,
        });
    }

    /// Append the system sentinel unless a listed font already carries its family.
    fn finish(mut self, language: &LanguageId) -> Vec<StackEntry> {
        let family = system_fallback_family(self.style, language);
        let collides = self.included.iter().any(|id| {
            self.style
                .font(id.as_str())
                .is_some_and(|font| signatures_match(&font.name, family))
        });
        if !collides {
            self.entries.push(StackEntry {
                font: None,
                family_alias: family.to_string(),
                glyphs: GlyphHandle::none(),
                settings: system_fallback_settings(self.style, language),
            });
        }
        self.entries
    }
}
