// this_file: crates/fontweave-engine/src/resolve.rs

//! Effective-settings resolution.
//!
//! Every settable field resolves as: explicit value on the font, then the
//! explicit value on its ancestor, then the style default. Fonts standing in
//! for the primary font borrow the primary defaults; plain fallbacks borrow
//! the fallback defaults.

use crate::legacy;
use fontweave_core::{
    Font, FontOrigin, LanguageId, ResolvedSettings, Style, StyleDefaults,
};

/// The font settings are inherited from, one hop up.
pub fn ancestor<'a>(style: &'a Style, font: &Font) -> Option<&'a Font> {
    match &font.origin {
        FontOrigin::Root => None,
        FontOrigin::Clone { parent: Some(parent) } => style.font(parent.as_str()),
        FontOrigin::Clone { parent: None } => legacy::ancestor_by_signature(style, font),
    }
}

/// Resolve the effective settings of `font_id`, or `None` if the style has no such font.
pub fn effective_settings(style: &Style, font_id: &str) -> Option<ResolvedSettings> {
    style.font(font_id).map(|font| resolve_font(style, font))
}

/// Resolve the effective settings of a font record belonging to `style`.
pub fn resolve_font(style: &Style, font: &Font) -> ResolvedSettings {
    let defaults = &style.defaults;

    // Nothing sits above the primary font.
    if font.is_global_primary() {
        return ResolvedSettings {
            scale: 100.0,
            line_height: defaults.line_height,
            letter_spacing: defaults.letter_spacing,
            weight: defaults.weight,
            font_size_adjust: font.settings.font_size_adjust,
            ascent_override: font.settings.ascent_override,
            descent_override: font.settings.descent_override,
            line_gap_override: font.settings.line_gap_override,
            color: font.settings.color.clone(),
            hidden: false,
        };
    }

    let ancestor = ancestor(style, font);
    let inherited = match ancestor {
        Some(ancestor) => font.settings.or(&ancestor.settings),
        None => font.settings.clone(),
    };
    let stands_for_primary =
        font.primary_override || ancestor.is_some_and(Font::is_global_primary);
    let base = Defaults::new(defaults, stands_for_primary);

    ResolvedSettings {
        scale: inherited.scale.unwrap_or(base.scale),
        line_height: inherited.line_height.unwrap_or(base.line_height),
        letter_spacing: inherited.letter_spacing.unwrap_or(base.letter_spacing),
        weight: inherited.weight_override.unwrap_or(base.weight),
        font_size_adjust: inherited.font_size_adjust,
        ascent_override: inherited.ascent_override,
        descent_override: inherited.descent_override,
        line_gap_override: inherited.line_gap_override,
        color: inherited.color,
        hidden: inherited.hidden.unwrap_or(false),
    }
}

/// Settings of the system sentinel for `language`.
pub fn system_fallback_settings(style: &Style, language: &LanguageId) -> ResolvedSettings {
    let base = Defaults::new(&style.defaults, false);
    let patch = style
        .system_fallback_overrides
        .get(language)
        .map(|system| system.settings.clone())
        .unwrap_or_default();

    ResolvedSettings {
        scale: patch.scale.unwrap_or(base.scale),
        line_height: patch.line_height.unwrap_or(base.line_height),
        letter_spacing: patch.letter_spacing.unwrap_or(base.letter_spacing),
        weight: patch.weight_override.unwrap_or(base.weight),
        font_size_adjust: patch.font_size_adjust,
        ascent_override: patch.ascent_override,
        descent_override: patch.descent_override,
        line_gap_override: patch.line_gap_override,
        color: patch.color,
        hidden: false,
    }
}

/// Family of the system sentinel for `language`.
pub fn system_fallback_family<'a>(style: &'a Style, language: &LanguageId) -> &'a str {
    style
        .system_fallback_overrides
        .get(language)
        .and_then(|system| system.family.as_deref())
        .unwrap_or(&style.defaults.fallback_family)
}

struct Defaults {
    scale: f32,
    line_height: f32,
    letter_spacing: f32,
    weight: u16,
}

impl Defaults {
    fn new(defaults: &StyleDefaults, primary: bool) -> Self {
        if primary {
            Self {
                scale: defaults.font_scales.active,
                line_height: defaults.line_height,
                letter_spacing: defaults.letter_spacing,
                weight: defaults.weight,
            }
        } else {
            Self {
                scale: defaults.font_scales.fallback,
                line_height: defaults.fallback.line_height.unwrap_or(defaults.line_height),
                letter_spacing: defaults
                    .fallback
                    .letter_spacing
                    .unwrap_or(defaults.letter_spacing),
                weight: defaults.fallback.weight.unwrap_or(defaults.weight),
            }
        }
    }
}
