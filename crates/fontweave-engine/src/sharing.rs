// this_file: crates/fontweave-engine/src/sharing.rs

//! Identity and sharing analysis over a style's override maps.

use crate::legacy;
use fontweave_core::{FallbackLink, FallbackOverride, Font, FontId, FontOrigin, LanguageId, Style};
use std::collections::BTreeSet;

/// How a language currently relates to an original font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapping {
    /// No entry: the language inherits the original
    Unmapped,
    /// Explicit entry that still uses the original unchanged
    SoftLinked,
    /// The language uses this font in place of the original
    Mapped(FontId),
}

/// Look up how `language` maps `original`.
///
/// Primary-role originals use the flat primary map; fallback-role originals
/// use the nested fallback map, where the legacy flat form stands in for
/// every original.
pub fn mapping(style: &Style, language: &LanguageId, original: &FontId) -> Mapping {
    let Some(font) = style.font(original.as_str()) else {
        return Mapping::Unmapped;
    };

    if font.is_global_primary() {
        return match style.primary_font_overrides.get(language) {
            Some(id) if id == original => Mapping::SoftLinked,
            Some(id) => Mapping::Mapped(id.clone()),
            None => Mapping::Unmapped,
        };
    }

    match style.fallback_font_overrides.get(language) {
        None => Mapping::Unmapped,
        Some(FallbackOverride::Single(id)) => Mapping::Mapped(id.clone()),
        Some(FallbackOverride::Map(links)) => match links.get(original) {
            None => Mapping::Unmapped,
            Some(FallbackLink::Soft) => Mapping::SoftLinked,
            Some(link) if legacy::is_self_link(style, original, link) => Mapping::SoftLinked,
            Some(FallbackLink::Font(id)) => Mapping::Mapped(id.clone()),
        },
    }
}

/// The font `language` uses in place of `original` (itself when unmapped or soft-linked).
pub fn resolve_mapping(style: &Style, language: &LanguageId, original: &FontId) -> FontId {
    match mapping(style, language, original) {
        Mapping::Mapped(id) => id,
        Mapping::Unmapped | Mapping::SoftLinked => original.clone(),
    }
}

/// Languages whose overrides reference `font_id`, soft links included.
pub fn referrers(style: &Style, font_id: &FontId) -> BTreeSet<LanguageId> {
    let mut languages: BTreeSet<LanguageId> = style
        .primary_font_overrides
        .iter()
        .filter(|(_, target)| *target == font_id)
        .map(|(language, _)| language.clone())
        .collect();

    for (language, fallback) in &style.fallback_font_overrides {
        let referenced = match fallback {
            FallbackOverride::Single(id) => id == font_id,
            FallbackOverride::Map(links) => links.iter().any(|(key, link)| match link {
                FallbackLink::Soft => key == font_id,
                FallbackLink::Font(id) => id == font_id,
            }),
        };
        if referenced {
            languages.insert(language.clone());
        }
    }

    languages
}

pub fn is_referenced(style: &Style, font_id: &FontId) -> bool {
    !referrers(style, font_id).is_empty()
}

/// True if any language other than `language` maps to `font_id`.
pub fn is_shared(style: &Style, font_id: &FontId, language: &LanguageId) -> bool {
    let shared = referrers(style, font_id)
        .iter()
        .any(|other| other != language);
    if shared {
        log::debug!(
            target: "fontweave::sharing",
            "font {font_id} is shared beyond language {language}"
        );
    }
    shared
}

/// True if `font_id` is an independently sourced font that some language
/// uses directly, rather than a fork.
pub fn is_root_mapped(style: &Style, font_id: &FontId) -> bool {
    let Some(font) = style.font(font_id.as_str()) else {
        return false;
    };
    if !is_independently_sourced(style, font) {
        return false;
    }

    style
        .fallback_font_overrides
        .values()
        .any(|fallback| match fallback {
            FallbackOverride::Single(id) => id == font_id,
            FallbackOverride::Map(links) => links.iter().any(|(key, link)| {
                matches!(link, FallbackLink::Font(id) if id == font_id)
                    && !legacy::is_self_link(style, key, link)
            }),
        })
}

/// Root fonts, and legacy clones whose ancestor can no longer be found.
pub fn is_independently_sourced(style: &Style, font: &Font) -> bool {
    match &font.origin {
        FontOrigin::Root => true,
        FontOrigin::Clone { parent: Some(parent) } => !style.contains_font(parent.as_str()),
        FontOrigin::Clone { parent: None } => legacy::ancestor_by_signature(style, font).is_none(),
    }
}

/// Follow parent links to the independently sourced font at the top of the chain.
pub fn ultimate_ancestor(style: &Style, font_id: &FontId) -> FontId {
    let mut current = font_id.clone();
    let mut visited = BTreeSet::new();

    while visited.insert(current.clone()) {
        let Some(font) = style.font(current.as_str()) else {
            break;
        };
        let next = match &font.origin {
            FontOrigin::Root => None,
            FontOrigin::Clone { parent: Some(parent) } => Some(parent.clone()),
            FontOrigin::Clone { parent: None } => {
                legacy::ancestor_by_signature(style, font).map(|ancestor| ancestor.id.clone())
            }
        };
        match next {
            Some(parent) if style.contains_font(parent.as_str()) => current = parent,
            _ => break,
        }
    }

    current
}

/// An existing non-clone font with the same identity signature.
pub fn find_duplicate<'a>(style: &'a Style, signature: &str) -> Option<&'a FontId> {
    style
        .fonts
        .iter()
        .filter(|font| !font.is_clone())
        .find(|font| font.same_signature(signature))
        .map(|font| &font.id)
}
