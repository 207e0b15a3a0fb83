// this_file: crates/fontweave-engine/src/fork.rs

//! Copy-on-write editing of language-scoped font settings.
//!
//! Every function here mutates a private copy of a style and is meant to run
//! inside a single [`crate::FontStore`] transaction. They are total: missing
//! or inconsistent data is skipped or repaired, never reported as a failure.

use crate::sharing::{self, Mapping};
use fontweave_core::utils::derived_font_id;
use fontweave_core::{
    FallbackLink, FallbackOverride, Font, FontId, FontOrigin, FontRole, FontScope, FontSettings,
    LanguageId, Setting, Style, SystemFallbackOverride,
};
use std::collections::{BTreeMap, BTreeSet};

/// Result of [`update_scoped_setting`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForkOutcome {
    /// A new clone was created and the language redirected to it
    Forked { font: FontId },
    /// The language already owned the font; it was edited in place
    UpdatedInPlace { font: FontId },
    /// The original font does not exist in the style
    UnknownFont,
}

/// Result of [`unmap_font`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmapOutcome {
    /// The font was a derived specialization and was removed
    Deleted,
    /// The font was independently sourced and now is a global fallback
    Promoted,
    /// Entries were removed; the font itself was already global
    Unmapped,
    NotFound,
}

/// Result of [`add_font`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(FontId),
    /// A font with the same id or identity signature exists; nothing changed
    Duplicate(FontId),
}

/// Result of [`remove_font`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Ids of every removed font, the requested one first
    Removed(Vec<FontId>),
    /// The global primary cannot be removed, only replaced
    Refused,
    NotFound,
}

/// Set `setting` on the font `language` uses in place of `original`,
/// forking a language-specific clone when the edit would otherwise leak
/// into other languages.
pub fn update_scoped_setting(
    style: &mut Style,
    original: &FontId,
    language: &LanguageId,
    setting: Setting,
) -> ForkOutcome {
    let Some(original_font) = style.font(original.as_str()) else {
        log::warn!(
            target: "fontweave::fork",
            "style {}: cannot edit unknown font {original}",
            style.name
        );
        return ForkOutcome::UnknownFont;
    };

    // Editing a clone directly never re-resolves, so specialised fonts are
    // not cloned again.
    let editing_clone = original_font.is_clone();
    let (target, inherited) = if editing_clone {
        (Some(original.clone()), false)
    } else {
        match sharing::mapping(style, language, original) {
            Mapping::Unmapped => (None, true),
            Mapping::SoftLinked => (Some(original.clone()), true),
            Mapping::Mapped(id) if style.contains_font(id.as_str()) => {
                let soft = id == *original && !sharing::is_root_mapped(style, &id);
                (Some(id), soft)
            }
            // Dangling mapping: start over from the original
            Mapping::Mapped(_) => (None, true),
        }
    };

    let shared = target
        .as_ref()
        .is_some_and(|id| sharing::is_shared(style, id, language));

    if !inherited && !shared {
        if let Some(id) = target.clone() {
            let property = setting.property();
            if let Some(font) = style.font_mut(id.as_str()) {
                font.settings.apply(setting);
            }
            log::debug!(
                target: "fontweave::fork",
                "style {}: set {property} on {id} in place for {language}",
                style.name
            );
            return ForkOutcome::UpdatedInPlace { font: id };
        }
    }

    // Fork: from the shared clone's current specialization, or from scratch.
    let source_id = match &target {
        Some(id) if shared && !inherited => id.clone(),
        _ => original.clone(),
    };
    let font = fork_font(style, &source_id, language, setting, shared && !inherited);
    let new_id = font.id.clone();
    style.insert_font(font);
    redirect(style, language, original, &new_id, editing_clone);
    style.languages.insert(language.clone());

    log::debug!(
        target: "fontweave::fork",
        "style {}: forked {source_id} as {new_id} for {language}",
        style.name
    );
    ForkOutcome::Forked { font: new_id }
}

fn fork_font(
    style: &Style,
    source: &FontId,
    language: &LanguageId,
    setting: Setting,
    keep_source_settings: bool,
) -> Font {
    let ancestor = sharing::ultimate_ancestor(style, source);
    let id = style.unique_font_id(&derived_font_id(&ancestor, language));

    let template = style
        .font(source.as_str())
        .or_else(|| style.font(ancestor.as_str()));
    let (name, file_name, glyphs, status, metadata, primary_override) = match template {
        Some(font) => (
            font.name.clone(),
            font.file_name.clone(),
            font.glyphs.clone(),
            font.status.clone(),
            font.metadata,
            font.primary_override || font.is_global_primary(),
        ),
        None => (
            ancestor.to_string(),
            None,
            Default::default(),
            Default::default(),
            None,
            false,
        ),
    };

    let mut settings = match template {
        Some(font) if keep_source_settings && font.is_clone() => font.settings.clone(),
        _ => FontSettings::default(),
    };
    settings.apply(setting);

    Font {
        id,
        name,
        file_name,
        origin: FontOrigin::Clone {
            parent: Some(ancestor),
        },
        role: FontRole::Fallback,
        primary_override,
        scope: FontScope::LanguageSpecific,
        settings,
        glyphs,
        status,
        metadata,
    }
}

/// Point `language`'s mapping for `original` at `replacement`.
fn redirect(
    style: &mut Style,
    language: &LanguageId,
    original: &FontId,
    replacement: &FontId,
    editing_clone: bool,
) {
    if editing_clone && repoint_existing(style, language, original, replacement) {
        return;
    }

    // A directly edited clone that this language did not map yet is keyed
    // under its ancestor.
    let key = if editing_clone {
        sharing::ultimate_ancestor(style, original)
    } else {
        original.clone()
    };

    let primary = style
        .font(key.as_str())
        .is_some_and(Font::is_global_primary);
    if primary {
        style
            .primary_font_overrides
            .insert(language.clone(), replacement.clone());
        return;
    }

    match style.fallback_font_overrides.get_mut(language) {
        Some(FallbackOverride::Single(id)) => *id = replacement.clone(),
        Some(FallbackOverride::Map(links)) => {
            links.insert(key, FallbackLink::Font(replacement.clone()));
        }
        None => {
            let mut links = BTreeMap::new();
            links.insert(key, FallbackLink::Font(replacement.clone()));
            style
                .fallback_font_overrides
                .insert(language.clone(), FallbackOverride::Map(links));
        }
    }
}

/// Replace every entry of `language` that targets `from`. Returns whether any did.
fn repoint_existing(style: &mut Style, language: &LanguageId, from: &FontId, to: &FontId) -> bool {
    let mut found = false;
    if let Some(id) = style.primary_font_overrides.get_mut(language) {
        if id == from {
            *id = to.clone();
            found = true;
        }
    }
    match style.fallback_font_overrides.get_mut(language) {
        Some(FallbackOverride::Single(id)) if id == from => {
            *id = to.clone();
            found = true;
        }
        Some(FallbackOverride::Map(links)) => {
            for link in links.values_mut() {
                if matches!(link, FallbackLink::Font(id) if id == from) {
                    *link = FallbackLink::Font(to.clone());
                    found = true;
                }
            }
        }
        _ => {}
    }
    found
}

/// Remove every override entry that references `font_id`, soft links keyed
/// by it included. Returns the languages that lost an entry.
pub(crate) fn detach(style: &mut Style, font_id: &FontId) -> BTreeSet<LanguageId> {
    let mut affected = BTreeSet::new();

    style.primary_font_overrides.retain(|language, target| {
        let keep = target != font_id;
        if !keep {
            affected.insert(language.clone());
        }
        keep
    });

    style.fallback_font_overrides.retain(|language, fallback| match fallback {
        FallbackOverride::Single(id) => {
            let keep = id != font_id;
            if !keep {
                affected.insert(language.clone());
            }
            keep
        }
        FallbackOverride::Map(links) => {
            let before = links.len();
            links.retain(|key, link| match link {
                FallbackLink::Soft => key != font_id,
                FallbackLink::Font(id) => id != font_id,
            });
            if links.len() != before {
                affected.insert(language.clone());
            }
            true
        }
    });

    affected
}

/// Drop a font no override references any more: clones are deleted,
/// language-specific uploads are promoted to global fallbacks. Returns what
/// happened, or `None` if the font stays as it is.
pub(crate) fn release(style: &mut Style, font_id: &FontId) -> Option<UnmapOutcome> {
    if sharing::is_referenced(style, font_id) {
        return None;
    }
    let font = style.font(font_id.as_str())?;
    if font.is_global_primary() || font.scope == FontScope::Global {
        return None;
    }

    if sharing::is_independently_sourced(style, font) && !matches_primary(style, font) {
        promote(style, font_id);
        Some(UnmapOutcome::Promoted)
    } else {
        style.take_font(font_id.as_str());
        log::debug!(
            target: "fontweave::fork",
            "style {}: deleted orphaned clone {font_id}",
            style.name
        );
        Some(UnmapOutcome::Deleted)
    }
}

fn matches_primary(style: &Style, font: &Font) -> bool {
    style
        .primary_font()
        .is_some_and(|primary| primary.id != font.id && primary.same_signature(font.signature()))
}

fn promote(style: &mut Style, font_id: &FontId) {
    if let Some(font) = style.font_mut(font_id.as_str()) {
        font.scope = FontScope::Global;
        font.origin = FontOrigin::Root;
        font.role = FontRole::Fallback;
        font.primary_override = false;
        log::info!(target: "fontweave::fork", "promoted {font_id} to a global fallback");
    }
}

/// Remove every override entry pointing at `font_id`, then delete or
/// promote the font.
pub fn unmap_font(style: &mut Style, font_id: &FontId) -> UnmapOutcome {
    let Some(font) = style.font(font_id.as_str()) else {
        detach(style, font_id);
        return UnmapOutcome::NotFound;
    };

    let primary = font.is_global_primary();
    let independent = sharing::is_independently_sourced(style, font);
    let derived = font.is_clone() && (!independent || matches_primary(style, font));
    let global_root = !font.is_clone() && font.scope == FontScope::Global;

    let affected = detach(style, font_id);
    log::debug!(
        target: "fontweave::fork",
        "style {}: unmapped {font_id} from {} languages",
        style.name,
        affected.len()
    );

    if primary || global_root {
        UnmapOutcome::Unmapped
    } else if derived {
        style.take_font(font_id.as_str());
        UnmapOutcome::Deleted
    } else {
        promote(style, font_id);
        UnmapOutcome::Promoted
    }
}

/// Make `font_id` the single fallback font of `language`, releasing
/// whatever the language's fallback override pointed at before.
pub fn map_language_to_font(style: &mut Style, language: &LanguageId, font_id: &FontId) -> bool {
    if !style.contains_font(font_id.as_str()) {
        log::warn!(
            target: "fontweave::fork",
            "style {}: cannot map {language} to unknown font {font_id}",
            style.name
        );
        return false;
    }

    let previous = style
        .fallback_font_overrides
        .insert(
            language.clone(),
            FallbackOverride::Single(font_id.clone()),
        )
        .map(|fallback| fallback.targets().into_iter().cloned().collect::<Vec<_>>())
        .unwrap_or_default();
    style.languages.insert(language.clone());

    for id in previous.iter().filter(|id| *id != font_id) {
        release(style, id);
    }
    true
}

/// Add an explicit soft link from `language` to the global fallback `original`.
pub fn link_fallback(style: &mut Style, language: &LanguageId, original: &FontId) -> bool {
    let eligible = style
        .font(original.as_str())
        .is_some_and(|font| font.role == FontRole::Fallback && !font.is_clone());
    if !eligible {
        return false;
    }

    let mut released = Vec::new();
    match style.fallback_font_overrides.get_mut(language) {
        Some(FallbackOverride::Map(links)) => {
            links.entry(original.clone()).or_insert(FallbackLink::Soft);
        }
        existing => {
            if let Some(FallbackOverride::Single(id)) = existing {
                released.push(id.clone());
            }
            let mut links = BTreeMap::new();
            links.insert(original.clone(), FallbackLink::Soft);
            style
                .fallback_font_overrides
                .insert(language.clone(), FallbackOverride::Map(links));
        }
    }
    style.languages.insert(language.clone());

    for id in &released {
        release(style, id);
    }
    true
}

/// Clear every mapping of `language` and drop it from the configured set.
pub fn unmap_language(style: &mut Style, language: &LanguageId) {
    let mut previous = Vec::new();
    if let Some(id) = style.primary_font_overrides.remove(language) {
        previous.push(id);
    }
    if let Some(fallback) = style.fallback_font_overrides.remove(language) {
        previous.extend(fallback.targets().into_iter().cloned());
    }
    style.system_fallback_overrides.remove(language);
    style.languages.remove(language);

    for id in &previous {
        release(style, id);
    }
    log::debug!(
        target: "fontweave::fork",
        "style {}: unmapped language {language} ({} fonts released)",
        style.name,
        previous.len()
    );
}

/// Add an independently sourced font. Duplicate uploads are a no-op.
pub fn add_font(style: &mut Style, mut font: Font) -> AddOutcome {
    if style.contains_font(font.id.as_str()) {
        log::warn!(
            target: "fontweave::fork",
            "style {}: font id {} already exists",
            style.name,
            font.id
        );
        return AddOutcome::Duplicate(font.id);
    }
    if !font.is_clone() {
        if let Some(existing) = sharing::find_duplicate(style, font.signature()) {
            log::warn!(
                target: "fontweave::fork",
                "style {}: {} duplicates existing font {existing}",
                style.name,
                font.signature()
            );
            return AddOutcome::Duplicate(existing.clone());
        }
    }

    if font.role == FontRole::Primary {
        // Replacing the primary goes through the primary swap migration.
        font.role = FontRole::Fallback;
    }
    let id = font.id.clone();
    style.insert_font(font);
    AddOutcome::Added(id)
}

/// Add a font uploaded for one language and make it that language's fallback.
///
/// A duplicate upload changes nothing, not even the language's mapping.
pub fn add_language_font(style: &mut Style, language: &LanguageId, font: Font) -> AddOutcome {
    let outcome = add_font(style, font.with_scope(FontScope::LanguageSpecific));
    if let AddOutcome::Added(id) = &outcome {
        map_language_to_font(style, language, id);
    }
    outcome
}

/// Remove a font, every clone derived from it, and every entry referencing them.
pub fn remove_font(style: &mut Style, font_id: &FontId) -> RemoveOutcome {
    let Some(font) = style.font(font_id.as_str()) else {
        return RemoveOutcome::NotFound;
    };
    if font.is_global_primary() {
        log::warn!(
            target: "fontweave::fork",
            "style {}: refusing to remove the primary font {font_id}",
            style.name
        );
        return RemoveOutcome::Refused;
    }

    let mut doomed = vec![font_id.clone()];
    doomed.extend(
        style
            .fonts
            .iter()
            .filter(|candidate| candidate.id != *font_id && candidate.is_clone())
            .filter(|candidate| sharing::ultimate_ancestor(style, &candidate.id) == *font_id)
            .map(|candidate| candidate.id.clone()),
    );

    for id in &doomed {
        detach(style, id);
        style.take_font(id.as_str());
    }
    log::info!(
        target: "fontweave::fork",
        "style {}: removed {} font records rooted at {font_id}",
        style.name,
        doomed.len()
    );
    RemoveOutcome::Removed(doomed)
}

/// Install or clear the system sentinel patch for `language`.
pub fn set_system_fallback(
    style: &mut Style,
    language: &LanguageId,
    system: Option<SystemFallbackOverride>,
) {
    match system {
        Some(system) => {
            style
                .system_fallback_overrides
                .insert(language.clone(), system);
            style.languages.insert(language.clone());
        }
        None => {
            style.system_fallback_overrides.remove(language);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::effective_settings;

    fn lang(id: &str) -> LanguageId {
        LanguageId::new(id)
    }

    fn id(id: &str) -> FontId {
        FontId::new(id)
    }

    fn edit(style: &mut Style, font: &str, language: &str, setting: Setting) -> ForkOutcome {
        update_scoped_setting(style, &id(font), &lang(language), setting)
    }

    fn base_style() -> Style {
        let mut style = Style::new("body", Font::primary("P", "Inter").with_file_name("Inter.ttf"));
        style.insert_font(Font::root("F1", "Noto Sans").with_file_name("NotoSans.ttf"));
        style.insert_font(Font::root("F2", "Noto Serif").with_file_name("NotoSerif.ttf"));
        style
    }

    fn links(style: &Style, language: &str) -> BTreeMap<FontId, FallbackLink> {
        match style.fallback_font_overrides.get(language) {
            Some(FallbackOverride::Map(links)) => links.clone(),
            other => panic!("expected nested override for {language}, got {other:?}"),
        }
    }

    #[test]
    fn test_fork_from_unmapped() {
        let mut style = base_style();
        let outcome = edit(&mut style, "F1", "de", Setting::LineHeight(Some(1.8)));
        assert_eq!(outcome, ForkOutcome::Forked { font: id("F1@de") });

        let clone = style.font("F1@de").unwrap();
        assert_eq!(clone.parent(), Some(&id("F1")));
        assert_eq!(clone.scope, FontScope::LanguageSpecific);
        assert_eq!(clone.file_name.as_deref(), Some("NotoSans.ttf"));
        assert_eq!(clone.settings, FontSettings::only(Setting::LineHeight(Some(1.8))));
        assert_eq!(links(&style, "de").get("F1"), Some(&FallbackLink::Font(id("F1@de"))));
        assert!(style.languages.contains("de"));
    }

    #[test]
    fn test_second_edit_is_in_place() {
        let mut style = base_style();
        edit(&mut style, "F1", "de", Setting::Scale(Some(110.0)));
        let count = style.fonts.len();

        let outcome = edit(&mut style, "F1", "de", Setting::Scale(Some(115.0)));
        assert_eq!(outcome, ForkOutcome::UpdatedInPlace { font: id("F1@de") });
        assert_eq!(style.fonts.len(), count);
        assert_eq!(effective_settings(&style, "F1@de").unwrap().scale, 115.0);
    }

    #[test]
    fn test_editing_clone_directly_does_not_reclone() {
        let mut style = base_style();
        edit(&mut style, "F1", "de", Setting::Scale(Some(110.0)));
        let count = style.fonts.len();

        let outcome = edit(&mut style, "F1@de", "de", Setting::Hidden(Some(true)));
        assert_eq!(outcome, ForkOutcome::UpdatedInPlace { font: id("F1@de") });
        assert_eq!(style.fonts.len(), count);
    }

    #[test]
    fn test_shared_clone_forks_with_its_specialization() {
        let mut style = base_style();
        edit(&mut style, "F1", "de", Setting::Scale(Some(110.0)));
        // Another language ends up pointing at the same clone
        let mut shared = BTreeMap::new();
        shared.insert(id("F1"), FallbackLink::Font(id("F1@de")));
        style
            .fallback_font_overrides
            .insert(lang("nl"), FallbackOverride::Map(shared));

        let outcome = edit(&mut style, "F1", "nl", Setting::LetterSpacing(Some(0.2)));
        assert_eq!(outcome, ForkOutcome::Forked { font: id("F1@nl") });

        let forked = style.font("F1@nl").unwrap();
        assert_eq!(forked.settings.scale, Some(110.0));
        assert_eq!(forked.settings.letter_spacing, Some(0.2));
        assert_eq!(forked.parent(), Some(&id("F1")));
        assert_eq!(effective_settings(&style, "F1@de").unwrap().letter_spacing, 0.0);
        assert_eq!(links(&style, "de").get("F1"), Some(&FallbackLink::Font(id("F1@de"))));
    }

    #[test]
    fn test_primary_edit_creates_primary_override() {
        let mut style = base_style();
        let outcome = edit(&mut style, "P", "ja", Setting::Scale(Some(90.0)));
        assert_eq!(outcome, ForkOutcome::Forked { font: id("P@ja") });
        assert_eq!(style.primary_font_overrides.get("ja"), Some(&id("P@ja")));

        let clone = style.font("P@ja").unwrap();
        assert!(clone.primary_override);
        assert_eq!(clone.role, FontRole::Fallback);
        assert_eq!(effective_settings(&style, "P").unwrap().scale, 100.0);
        assert_eq!(effective_settings(&style, "P@ja").unwrap().scale, 90.0);
    }

    #[test]
    fn test_unknown_font() {
        let mut style = base_style();
        let before = style.clone();
        let outcome = edit(&mut style, "GHOST", "fr", Setting::Scale(Some(1.0)));
        assert_eq!(outcome, ForkOutcome::UnknownFont);
        assert_eq!(style, before);
    }

    #[test]
    fn test_unmap_clone_deletes_it() {
        let mut style = base_style();
        edit(&mut style, "F1", "de", Setting::Scale(Some(110.0)));

        assert_eq!(unmap_font(&mut style, &id("F1@de")), UnmapOutcome::Deleted);
        assert!(!style.contains_font("F1@de"));
        assert!(links(&style, "de").is_empty());
    }

    #[test]
    fn test_unmap_root_mapped_promotes() {
        let mut style = base_style();
        let outcome = add_language_font(
            &mut style,
            &lang("vi"),
            Font::root("Fvi", "Be Vietnam Pro").with_file_name("BeVietnamPro.ttf"),
        );
        assert_eq!(outcome, AddOutcome::Added(id("Fvi")));
        assert_eq!(style.font("Fvi").unwrap().scope, FontScope::LanguageSpecific);

        assert_eq!(unmap_font(&mut style, &id("Fvi")), UnmapOutcome::Promoted);
        let font = style.font("Fvi").unwrap();
        assert_eq!(font.scope, FontScope::Global);
        assert_eq!(font.origin, FontOrigin::Root);
        assert!(!style.fallback_font_overrides.contains_key("vi"));
    }

    #[test]
    fn test_unmap_global_root_only_removes_entries() {
        let mut style = base_style();
        link_fallback(&mut style, &lang("es"), &id("F1"));
        assert_eq!(unmap_font(&mut style, &id("F1")), UnmapOutcome::Unmapped);
        assert!(style.contains_font("F1"));
        assert!(links(&style, "es").is_empty());
        assert_eq!(unmap_font(&mut style, &id("GHOST")), UnmapOutcome::NotFound);
    }

    #[test]
    fn test_map_language_releases_previous_clone() {
        let mut style = base_style();
        edit(&mut style, "F1", "de", Setting::Scale(Some(110.0)));
        assert!(style.contains_font("F1@de"));

        assert!(map_language_to_font(&mut style, &lang("de"), &id("F2")));
        assert!(!style.contains_font("F1@de"));
        assert_eq!(
            style.fallback_font_overrides.get("de"),
            Some(&FallbackOverride::Single(id("F2")))
        );
        assert!(!map_language_to_font(&mut style, &lang("de"), &id("GHOST")));
    }

    #[test]
    fn test_map_language_keeps_clone_used_elsewhere() {
        let mut style = base_style();
        edit(&mut style, "F1", "de", Setting::Scale(Some(110.0)));
        let mut shared = BTreeMap::new();
        shared.insert(id("F1"), FallbackLink::Font(id("F1@de")));
        style
            .fallback_font_overrides
            .insert(lang("nl"), FallbackOverride::Map(shared));

        map_language_to_font(&mut style, &lang("de"), &id("F2"));
        assert!(style.contains_font("F1@de"));
    }

    #[test]
    fn test_unmap_language() {
        let mut style = base_style();
        edit(&mut style, "P", "ja", Setting::Scale(Some(90.0)));
        edit(&mut style, "F1", "ja", Setting::Scale(Some(90.0)));
        set_system_fallback(&mut style, &lang("ja"), Some(SystemFallbackOverride::default()));

        unmap_language(&mut style, &lang("ja"));
        assert!(!style.contains_font("P@ja"));
        assert!(!style.contains_font("F1@ja"));
        assert!(style.primary_font_overrides.is_empty());
        assert!(style.fallback_font_overrides.is_empty());
        assert!(style.system_fallback_overrides.is_empty());
        assert!(!style.languages.contains("ja"));
    }

    #[test]
    fn test_duplicate_upload_is_noop() {
        let mut style = base_style();
        let before = style.clone();
        let outcome = add_font(&mut style, Font::root("F3", "Other").with_file_name("notosans.ttf"));
        assert_eq!(outcome, AddOutcome::Duplicate(id("F1")));
        assert_eq!(style, before);

        let outcome = add_font(&mut style, Font::root("F2", "Anything"));
        assert_eq!(outcome, AddOutcome::Duplicate(id("F2")));
    }

    #[test]
    fn test_added_primary_is_demoted() {
        let mut style = base_style();
        add_font(&mut style, Font::primary("P2", "Roboto"));
        assert_eq!(style.font("P2").unwrap().role, FontRole::Fallback);
        assert_eq!(style.primary_font().unwrap().id, id("P"));
    }

    #[test]
    fn test_remove_font_takes_clones_along() {
        let mut style = base_style();
        edit(&mut style, "F1", "de", Setting::Scale(Some(110.0)));
        link_fallback(&mut style, &lang("es"), &id("F1"));

        let outcome = remove_font(&mut style, &id("F1"));
        assert_eq!(outcome, RemoveOutcome::Removed(vec![id("F1"), id("F1@de")]));
        assert!(links(&style, "de").is_empty());
        assert!(links(&style, "es").is_empty());
        assert_eq!(remove_font(&mut style, &id("P")), RemoveOutcome::Refused);
        assert_eq!(remove_font(&mut style, &id("F1")), RemoveOutcome::NotFound);
    }

    #[test]
    fn test_link_fallback_replaces_single_form() {
        let mut style = base_style();
        add_language_font(&mut style, &lang("vi"), Font::root("Fvi", "Be Vietnam Pro"));
        assert!(link_fallback(&mut style, &lang("vi"), &id("F2")));

        assert_eq!(links(&style, "vi").get("F2"), Some(&FallbackLink::Soft));
        // The released upload survives as a global font
        assert_eq!(style.font("Fvi").unwrap().scope, FontScope::Global);
        assert!(!link_fallback(&mut style, &lang("vi"), &id("P")));
    }

    fn stack_ids(style: &Style, language: &str) -> Vec<Option<FontId>> {
        crate::stack::build_stack(style, &lang(language))
            .into_iter()
            .map(|entry| entry.font)
            .collect()
    }

    #[test]
    fn test_legacy_self_link_forks_without_validation() {
        let mut style = base_style();
        let mut legacy = BTreeMap::new();
        legacy.insert(id("F1"), FallbackLink::Font(id("F1")));
        style
            .fallback_font_overrides
            .insert(lang("fr"), FallbackOverride::Map(legacy));

        // The self-link claims nothing
        assert_eq!(
            stack_ids(&style, "en"),
            vec![Some(id("F1")), Some(id("F2")), None]
        );

        let outcome = edit(&mut style, "F1", "fr", Setting::Scale(Some(120.0)));
        assert_eq!(outcome, ForkOutcome::Forked { font: id("F1@fr") });
        assert_eq!(style.font("F1").unwrap().settings.scale, None);
        assert_eq!(effective_settings(&style, "F1").unwrap().scale, 100.0);
        assert_eq!(links(&style, "fr").get("F1"), Some(&FallbackLink::Font(id("F1@fr"))));
    }

    #[test]
    fn test_duplicate_language_upload_is_noop() {
        let mut style = base_style();
        let en_before = stack_ids(&style, "en");
        let before = style.clone();

        let outcome = add_language_font(
            &mut style,
            &lang("vi"),
            Font::root("Fvi", "Noto Sans copy").with_file_name("notosans.ttf"),
        );
        assert_eq!(outcome, AddOutcome::Duplicate(id("F1")));
        assert_eq!(style, before);
        assert_eq!(stack_ids(&style, "en"), en_before);
        assert!(!style.fallback_font_overrides.contains_key("vi"));
    }
}
