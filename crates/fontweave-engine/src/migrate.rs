// this_file: crates/fontweave-engine/src/migrate.rs

//! Primary font replacement.
//!
//! Swapping the primary re-evaluates who owns every primary override once,
//! here, instead of during resolution.

use crate::validate::{validate, ValidationReport};
use fontweave_core::{FallbackLink, FallbackOverride, FontId, FontOrigin, FontRole, FontScope, Style};

/// Result of [`set_primary_font`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimarySwap {
    Swapped {
        previous: Option<FontId>,
        report: ValidationReport,
    },
    AlreadyPrimary,
    NotFound,
    /// Clones cannot become the primary font
    NotEligible,
}

/// Make `font_id` the global primary of `style`.
///
/// The old primary stays as a global fallback. Primary-override clones are
/// re-parented onto the new primary and adopt its file, keeping their own
/// settings. Fallback entries that referenced the new primary are dropped.
pub fn set_primary_font(style: &mut Style, font_id: &FontId) -> PrimarySwap {
    let Some(font) = style.font(font_id.as_str()) else {
        return PrimarySwap::NotFound;
    };
    if font.is_global_primary() {
        return PrimarySwap::AlreadyPrimary;
    }
    if font.is_clone() {
        log::warn!(
            target: "fontweave::migrate",
            "style {}: clone {font_id} cannot become the primary font",
            style.name
        );
        return PrimarySwap::NotEligible;
    }

    let previous = style.primary_font().map(|primary| primary.id.clone());
    for font in style.fonts.iter_mut() {
        if font.role == FontRole::Primary {
            font.role = FontRole::Fallback;
        }
    }

    let Some(index) = style.font_index(font_id.as_str()) else {
        return PrimarySwap::NotFound;
    };
    let mut primary = style.fonts.remove(index);
    primary.role = FontRole::Primary;
    primary.scope = FontScope::Global;
    primary.origin = FontOrigin::Root;
    primary.primary_override = false;
    style.fonts.insert(0, primary.clone());

    for font in style.fonts.iter_mut().filter(|font| font.primary_override) {
        font.origin = FontOrigin::Clone {
            parent: Some(font_id.clone()),
        };
        font.name = primary.name.clone();
        font.file_name = primary.file_name.clone();
        font.glyphs = primary.glyphs.clone();
        font.status = primary.status.clone();
        font.metadata = primary.metadata;
    }

    style
        .primary_font_overrides
        .retain(|_, target| target != font_id);
    style.fallback_font_overrides.retain(|_, fallback| match fallback {
        FallbackOverride::Single(id) => id != font_id,
        FallbackOverride::Map(links) => {
            links.retain(|key, link| {
                key != font_id && !matches!(link, FallbackLink::Font(id) if id == font_id)
            });
            true
        }
    });

    let report = validate(style);
    log::info!(
        target: "fontweave::migrate",
        "style {}: primary font {} -> {font_id}",
        style.name,
        previous.as_ref().map_or("<none>", FontId::as_str)
    );
    PrimarySwap::Swapped { previous, report }
}
