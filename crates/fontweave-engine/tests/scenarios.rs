// this_file: crates/fontweave-engine/tests/scenarios.rs

//! End-to-end editing scenarios run through the store.

use fontweave_core::{
    FallbackLink, FallbackOverride, Font, FontId, FontRole, FontScope, LanguageId, Setting, Style,
};
use fontweave_engine::{
    build_stack, effective_settings, validate, AddOutcome, ForkOutcome, FontStore, PrimarySwap,
    RemoveOutcome, UnmapOutcome,
};
use std::collections::BTreeMap;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn lang(id: &str) -> LanguageId {
    LanguageId::new(id)
}

fn id(id: &str) -> FontId {
    FontId::new(id)
}

fn base_style() -> Style {
    let mut style = Style::new("body", Font::primary("P", "Inter").with_file_name("Inter.ttf"));
    style.insert_font(Font::root("F1", "Noto Sans").with_file_name("NotoSans.ttf"));
    style.insert_font(Font::root("F2", "Noto Serif").with_file_name("NotoSerif.ttf"));
    style
}

fn store_with(style: Style) -> FontStore {
    FontStore::from_styles([style]).unwrap()
}

fn stack_ids(style: &Style, language: &str) -> Vec<String> {
    build_stack(style, &lang(language))
        .iter()
        .map(|entry| {
            entry
                .font
                .as_ref()
                .map_or_else(|| "<system>".to_string(), FontId::to_string)
        })
        .collect()
}

#[test]
fn test_two_languages_soft_linking_one_font() {
    init_logging();
    let mut style = base_style();
    // Written by an older version: self-references mean "soft link"
    for language in ["fr", "es"] {
        let mut links = BTreeMap::new();
        links.insert(id("F1"), FallbackLink::Font(id("F1")));
        style
            .fallback_font_overrides
            .insert(lang(language), FallbackOverride::Map(links));
    }
    validate(&mut style);
    let store = store_with(style);

    let outcome = store
        .update_scoped_setting("body", &id("F1"), &lang("fr"), Setting::Scale(Some(120.0)))
        .unwrap();
    assert_eq!(outcome, ForkOutcome::Forked { font: id("F1@fr") });

    let style = store.get_style("body").unwrap();
    let clone = style.font("F1@fr").unwrap();
    assert_eq!(clone.parent(), Some(&id("F1")));
    assert_eq!(clone.settings.scale, Some(120.0));
    assert_eq!(style.font("F1").unwrap().settings.scale, None);

    let Some(FallbackOverride::Map(fr)) = style.fallback_font_overrides.get("fr") else {
        panic!("fr override missing");
    };
    assert_eq!(fr.get("F1"), Some(&FallbackLink::Font(id("F1@fr"))));
    let Some(FallbackOverride::Map(es)) = style.fallback_font_overrides.get("es") else {
        panic!("es override missing");
    };
    assert_eq!(es.get("F1"), Some(&FallbackLink::Soft));

    assert_eq!(effective_settings(&style, "F1@fr").unwrap().scale, 120.0);
    assert_eq!(effective_settings(&style, "F1").unwrap().scale, 100.0);
    assert_eq!(stack_ids(&style, "es")[0], "F1");
    assert_eq!(stack_ids(&style, "fr")[0], "F1@fr");
}

#[test]
fn test_unvalidated_self_links_fork_on_edit() {
    init_logging();
    let mut style = base_style();
    for language in ["fr", "es"] {
        let mut links = BTreeMap::new();
        links.insert(id("F1"), FallbackLink::Font(id("F1")));
        style
            .fallback_font_overrides
            .insert(lang(language), FallbackOverride::Map(links));
    }
    let store = store_with(style);

    let outcome = store
        .update_scoped_setting("body", &id("F1"), &lang("fr"), Setting::Scale(Some(120.0)))
        .unwrap();
    assert_eq!(outcome, ForkOutcome::Forked { font: id("F1@fr") });

    let style = store.get_style("body").unwrap();
    assert_eq!(style.font("F1").unwrap().settings.scale, None);
    assert_eq!(effective_settings(&style, "F1").unwrap().scale, 100.0);
    assert_eq!(effective_settings(&style, "F1@fr").unwrap().scale, 120.0);
    assert_eq!(stack_ids(&style, "fr")[0], "F1@fr");
    assert_eq!(stack_ids(&style, "es")[0], "F1");
    assert_eq!(stack_ids(&style, "en"), vec!["F1", "F2", "<system>"]);
}

#[test]
fn test_fork_isolation_on_shared_clone() {
    init_logging();
    let store = store_with(base_style());
    store
        .update_scoped_setting("body", &id("F1"), &lang("de"), Setting::Scale(Some(110.0)))
        .unwrap();
    // Point a second language at the same clone
    store
        .edit_style("body", |style| {
            let mut links = BTreeMap::new();
            links.insert(id("F1"), FallbackLink::Font(id("F1@de")));
            style
                .fallback_font_overrides
                .insert(lang("at"), FallbackOverride::Map(links));
        })
        .unwrap();

    let de_before = effective_settings(&store.get_style("body").unwrap(), "F1@de").unwrap();
    let outcome = store
        .update_scoped_setting("body", &id("F1"), &lang("at"), Setting::Scale(Some(90.0)))
        .unwrap();
    let ForkOutcome::Forked { font: at_font } = outcome else {
        panic!("expected a fork");
    };

    let style = store.get_style("body").unwrap();
    assert_eq!(effective_settings(&style, "F1@de").unwrap(), de_before);
    assert_eq!(effective_settings(&style, at_font.as_str()).unwrap().scale, 90.0);

    // And the other way round
    store
        .update_scoped_setting("body", &id("F1"), &lang("de"), Setting::Scale(Some(130.0)))
        .unwrap();
    let style = store.get_style("body").unwrap();
    assert_eq!(effective_settings(&style, at_font.as_str()).unwrap().scale, 90.0);
    assert_eq!(effective_settings(&style, "F1@de").unwrap().scale, 130.0);
}

#[test]
fn test_in_place_stability() {
    let store = store_with(base_style());
    store
        .update_scoped_setting("body", &id("F2"), &lang("pl"), Setting::Scale(Some(105.0)))
        .unwrap();
    let count = store.get_style("body").unwrap().fonts.len();

    for (step, scale) in [106.0, 107.0, 108.0].into_iter().enumerate() {
        let outcome = store
            .update_scoped_setting("body", &id("F2"), &lang("pl"), Setting::Scale(Some(scale)))
            .unwrap();
        assert_eq!(outcome, ForkOutcome::UpdatedInPlace { font: id("F2@pl") }, "step {step}");
    }
    let style = store.get_style("body").unwrap();
    assert_eq!(style.fonts.len(), count);
    assert_eq!(effective_settings(&style, "F2@pl").unwrap().scale, 108.0);
}

#[test]
fn test_inheritance_is_resolved_lazily() {
    let store = store_with(base_style());
    store
        .update_scoped_setting("body", &id("F1"), &lang("it"), Setting::Color(Some("#111".into())))
        .unwrap();
    let style = store.get_style("body").unwrap();
    assert_eq!(effective_settings(&style, "F1@it").unwrap().scale, 100.0);

    store
        .edit_style("body", |style| {
            style.font_mut("F1").unwrap().settings.apply(Setting::Scale(Some(140.0)));
            style.font_mut("F1").unwrap().settings.apply(Setting::LineHeight(Some(1.5)));
        })
        .unwrap();
    let style = store.get_style("body").unwrap();
    let settings = effective_settings(&style, "F1@it").unwrap();
    assert_eq!(settings.scale, 140.0);
    assert_eq!(settings.line_height, 1.5);
    assert_eq!(settings.color.as_deref(), Some("#111"));

    store
        .update_scoped_setting("body", &id("F1"), &lang("it"), Setting::Scale(Some(90.0)))
        .unwrap();
    let style = store.get_style("body").unwrap();
    assert_eq!(effective_settings(&style, "F1@it").unwrap().scale, 90.0);
    assert_eq!(effective_settings(&style, "F1").unwrap().scale, 140.0);
}

#[test]
fn test_unmapping_language_upload_promotes_it() {
    let store = store_with(base_style());
    let outcome = store
        .add_language_font(
            "body",
            &lang("vi"),
            Font::root("Fvi", "Be Vietnam Pro").with_file_name("BeVietnamPro.ttf"),
        )
        .unwrap();
    assert_eq!(outcome, AddOutcome::Added(id("Fvi")));
    assert_eq!(stack_ids(&store.get_style("body").unwrap(), "vi")[0], "Fvi");
    assert!(!stack_ids(&store.get_style("body").unwrap(), "en").contains(&"Fvi".to_string()));

    let outcome = store.unmap_font("body", &id("Fvi")).unwrap();
    assert_eq!(outcome, UnmapOutcome::Promoted);

    let style = store.get_style("body").unwrap();
    let font = style.font("Fvi").unwrap();
    assert_eq!(font.scope, FontScope::Global);
    assert!(stack_ids(&style, "en").contains(&"Fvi".to_string()));
}

#[test]
fn test_dangling_override_is_emptied() {
    let mut style = base_style();
    let mut links = BTreeMap::new();
    links.insert(id("F9"), FallbackLink::Font(id("GHOST")));
    style
        .fallback_font_overrides
        .insert(lang("he"), FallbackOverride::Map(links));

    let mut expected = style.clone();
    expected
        .fallback_font_overrides
        .insert(lang("he"), FallbackOverride::Map(BTreeMap::new()));

    let store = store_with(style);
    let report = store.validate("body").unwrap();
    assert_eq!(report.dangling.len(), 1);
    assert_eq!(*store.get_style("body").unwrap(), expected);
}

#[test]
fn test_validation_is_idempotent() {
    let mut style = base_style();
    style.primary_font_overrides.insert(lang("ja"), id("GHOST"));
    style
        .fallback_font_overrides
        .insert(lang("ko"), FallbackOverride::Single(id("MISSING")));
    let mut orphan = Font::root("F1@xx", "Noto Sans").with_scope(FontScope::LanguageSpecific);
    orphan.origin = fontweave_core::FontOrigin::Clone {
        parent: Some(id("F1")),
    };
    style.insert_font(orphan);

    let store = store_with(style);
    let first = store.validate("body").unwrap();
    assert!(!first.is_clean());
    let revision = store.get_style("body").unwrap().revision;

    let second = store.validate("body").unwrap();
    assert!(second.is_clean());
    assert_eq!(store.get_style("body").unwrap().revision, revision);
}

#[test]
fn test_duplicate_upload_and_primary_removal() {
    let store = store_with(base_style());
    let before = store.get_style("body").unwrap();

    let outcome = store
        .add_font("body", Font::root("F3", "Noto Sans copy").with_file_name("NOTOSANS.ttf"))
        .unwrap();
    assert_eq!(outcome, AddOutcome::Duplicate(id("F1")));
    assert_eq!(store.remove_font("body", &id("P")).unwrap(), RemoveOutcome::Refused);
    assert_eq!(store.get_style("body").unwrap().revision, before.revision);
}

#[test]
fn test_primary_swap_keeps_language_primaries() {
    let store = store_with(base_style());
    store
        .update_scoped_setting("body", &id("P"), &lang("ja"), Setting::Scale(Some(92.0)))
        .unwrap();

    let outcome = store.set_primary_font("body", &id("F2")).unwrap();
    assert!(matches!(outcome, PrimarySwap::Swapped { .. }));

    let style = store.get_style("body").unwrap();
    assert_eq!(style.primary_font().unwrap().id, id("F2"));
    assert_eq!(style.font("P").unwrap().role, FontRole::Fallback);
    assert_eq!(style.font("P@ja").unwrap().parent(), Some(&id("F2")));
    assert_eq!(effective_settings(&style, "P@ja").unwrap().scale, 92.0);
    // The old primary keeps its slot as an ordinary fallback
    assert_eq!(stack_ids(&style, "en"), vec!["P", "F1", "<system>"]);
}
