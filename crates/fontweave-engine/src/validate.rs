// this_file: crates/fontweave-engine/src/validate.rs

//! Consistency repair for styles.
//!
//! Runs after load and after migrations. Dangling override entries are
//! dropped, language-specific fonts no override references are deleted, and
//! legacy self-links become soft links. A second run changes nothing.

use crate::legacy;
use crate::sharing;
use crate::snapshot::Snapshot;
use fontweave_core::{FallbackLink, FallbackOverride, FontId, FontScope, LanguageId, Style};
use serde::Serialize;
use std::collections::BTreeSet;

/// Which override map a dangling entry lived in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    Primary,
    Fallback,
}

/// An override entry that pointed at a font the style does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingOverride {
    pub language: LanguageId,
    pub kind: OverrideKind,
    /// Key of the nested entry; `None` for flat entries
    pub original: Option<FontId>,
    pub target: FontId,
}

/// What [`validate`] repaired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub dangling: Vec<DanglingOverride>,
    pub orphans_removed: Vec<FontId>,
    pub links_normalized: usize,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty()
            && self.orphans_removed.is_empty()
            && self.links_normalized == 0
    }
}

/// Repair `style` in place.
pub fn validate(style: &mut Style) -> ValidationReport {
    let mut report = ValidationReport {
        links_normalized: legacy::normalize_self_links(style),
        ..Default::default()
    };

    drop_dangling(style, &mut report);

    let candidates: Vec<FontId> = style
        .fonts
        .iter()
        .filter(|font| font.scope == FontScope::LanguageSpecific && !font.is_global_primary())
        .map(|font| font.id.clone())
        .collect();
    // Unreferenced language-specific records are dropped, never promoted.
    for id in candidates {
        if !sharing::is_referenced(style, &id) {
            style.take_font(id.as_str());
            report.orphans_removed.push(id);
        }
    }

    if report.is_clean() {
        log::trace!(target: "fontweave::validate", "style {} is consistent", style.name);
    } else {
        log::info!(
            target: "fontweave::validate",
            "style {}: dropped {} dangling entries, removed {} orphans",
            style.name,
            report.dangling.len(),
            report.orphans_removed.len()
        );
    }
    report
}

fn drop_dangling(style: &mut Style, report: &mut ValidationReport) {
    let existing: BTreeSet<FontId> = style.fonts.iter().map(|font| font.id.clone()).collect();

    style.primary_font_overrides.retain(|language, target| {
        let live = existing.contains(target);
        if !live {
            report.dangling.push(DanglingOverride {
                language: language.clone(),
                kind: OverrideKind::Primary,
                original: None,
                target: target.clone(),
            });
        }
        live
    });

    style.fallback_font_overrides.retain(|language, fallback| match fallback {
        FallbackOverride::Single(target) => {
            let live = existing.contains(target);
            if !live {
                report.dangling.push(DanglingOverride {
                    language: language.clone(),
                    kind: OverrideKind::Fallback,
                    original: None,
                    target: target.clone(),
                });
            }
            live
        }
        // Emptied maps stay: an empty override is still a configured language.
        FallbackOverride::Map(links) => {
            links.retain(|key, link| {
                let target = match &*link {
                    FallbackLink::Soft => key,
                    FallbackLink::Font(id) => id,
                };
                let live = existing.contains(target);
                if !live {
                    report.dangling.push(DanglingOverride {
                        language: language.clone(),
                        kind: OverrideKind::Fallback,
                        original: Some(key.clone()),
                        target: target.clone(),
                    });
                }
                live
            });
            true
        }
    });
}

/// Validate every style of a snapshot. Returns the reports of styles that
/// needed repairs, keyed by style name.
pub fn validate_snapshot(snapshot: &mut Snapshot) -> Vec<(String, ValidationReport)> {
    snapshot
        .styles
        .iter_mut()
        .filter_map(|style| {
            let report = validate(style);
            (!report.is_clean()).then(|| (style.name.clone(), report))
        })
        .collect()
}
