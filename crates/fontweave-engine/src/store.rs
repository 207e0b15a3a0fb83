// this_file: crates/fontweave-engine/src/store.rs

//! Font & style store.
//!
//! Styles are immutable values behind `Arc`. Every change builds the next
//! style from the current one and swaps it in under one write lock, so a
//! reader never observes an override map out of step with the font list.

use crate::fork::{self, AddOutcome, ForkOutcome, RemoveOutcome, UnmapOutcome};
use crate::migrate::{self, PrimarySwap};
use crate::validate::{self, ValidationReport};
use fontweave_core::{
    EngineConfig, Font, FontId, LanguageId, Result, Setting, Style, SystemFallbackOverride,
    WeaveError,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Named styles with atomic whole-style replacement.
#[derive(Default)]
pub struct FontStore {
    styles: RwLock<BTreeMap<String, Arc<Style>>>,
    revision: AtomicU64,
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already loaded styles.
    pub fn from_styles(styles: impl IntoIterator<Item = Style>) -> Result<Self> {
        let store = Self::new();
        for style in styles {
            store.insert_style(style)?;
        }
        Ok(store)
    }

    fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Latest revision handed out to any style
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Relaxed)
    }

    pub fn insert_style(&self, mut style: Style) -> Result<Arc<Style>> {
        let mut styles = self.styles.write();
        if styles.contains_key(&style.name) {
            return Err(WeaveError::DuplicateStyle(style.name));
        }
        style.revision = self.next_revision();
        let style = Arc::new(style);
        styles.insert(style.name.clone(), Arc::clone(&style));
        log::debug!(target: "fontweave::store", "inserted style {}", style.name);
        Ok(style)
    }

    /// Create an empty style around `primary` with the configured defaults.
    pub fn create_style(
        &self,
        name: &str,
        primary: Font,
        config: &EngineConfig,
    ) -> Result<Arc<Style>> {
        self.insert_style(Style::new(name, primary).with_defaults(config.style_defaults.clone()))
    }

    pub fn remove_style(&self, name: &str) -> Result<Arc<Style>> {
        self.styles
            .write()
            .remove(name)
            .ok_or_else(|| WeaveError::UnknownStyle(name.to_string()))
    }

    pub fn get_style(&self, name: &str) -> Option<Arc<Style>> {
        self.styles.read().get(name).cloned()
    }

    /// Current snapshot of every style, ordered by name.
    pub fn styles(&self) -> Vec<Arc<Style>> {
        self.styles.read().values().cloned().collect()
    }

    pub fn style_names(&self) -> Vec<String> {
        self.styles.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.styles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.read().is_empty()
    }

    /// Replace the style called `name` with whatever `updater` returns.
    ///
    /// The updater sees the current style and must return the complete next
    /// one. The name is kept; the revision is bumped only when the style
    /// actually changed.
    pub fn replace_style<F>(&self, name: &str, updater: F) -> Result<Arc<Style>>
    where
        F: FnOnce(&Style) -> Style,
    {
        let mut styles = self.styles.write();
        let current = styles
            .get(name)
            .ok_or_else(|| WeaveError::UnknownStyle(name.to_string()))?;

        let mut next = updater(current);
        if next == **current {
            return Ok(Arc::clone(current));
        }
        next.name = name.to_string();
        next.revision = self.next_revision();
        log::trace!(
            target: "fontweave::store",
            "style {name} advanced to revision {}",
            next.revision
        );

        let next = Arc::new(next);
        styles.insert(name.to_string(), Arc::clone(&next));
        Ok(next)
    }

    /// Run `edit` on a private copy of the style and commit the copy.
    pub fn edit_style<T, F>(&self, name: &str, edit: F) -> Result<T>
    where
        F: FnOnce(&mut Style) -> T,
    {
        let mut output = None;
        self.replace_style(name, |current| {
            let mut next = current.clone();
            output = Some(edit(&mut next));
            next
        })?;
        // replace_style only returns Ok after running the updater
        output.ok_or_else(|| WeaveError::UnknownStyle(name.to_string()))
    }

    pub fn update_scoped_setting(
        &self,
        style: &str,
        original: &FontId,
        language: &LanguageId,
        setting: Setting,
    ) -> Result<ForkOutcome> {
        self.edit_style(style, |s| fork::update_scoped_setting(s, original, language, setting))
    }

    pub fn unmap_font(&self, style: &str, font_id: &FontId) -> Result<UnmapOutcome> {
        self.edit_style(style, |s| fork::unmap_font(s, font_id))
    }

    pub fn map_language_to_font(
        &self,
        style: &str,
        language: &LanguageId,
        font_id: &FontId,
    ) -> Result<bool> {
        self.edit_style(style, |s| fork::map_language_to_font(s, language, font_id))
    }

    pub fn link_fallback(
        &self,
        style: &str,
        language: &LanguageId,
        original: &FontId,
    ) -> Result<bool> {
        self.edit_style(style, |s| fork::link_fallback(s, language, original))
    }

    pub fn unmap_language(&self, style: &str, language: &LanguageId) -> Result<()> {
        self.edit_style(style, |s| fork::unmap_language(s, language))
    }

    pub fn add_font(&self, style: &str, font: Font) -> Result<AddOutcome> {
        self.edit_style(style, |s| fork::add_font(s, font))
    }

    pub fn add_language_font(
        &self,
        style: &str,
        language: &LanguageId,
        font: Font,
    ) -> Result<AddOutcome> {
        self.edit_style(style, |s| fork::add_language_font(s, language, font))
    }

    pub fn remove_font(&self, style: &str, font_id: &FontId) -> Result<RemoveOutcome> {
        self.edit_style(style, |s| fork::remove_font(s, font_id))
    }

    pub fn set_system_fallback(
        &self,
        style: &str,
        language: &LanguageId,
        system: Option<SystemFallbackOverride>,
    ) -> Result<()> {
        self.edit_style(style, |s| fork::set_system_fallback(s, language, system))
    }

    pub fn set_primary_font(&self, style: &str, font_id: &FontId) -> Result<PrimarySwap> {
        self.edit_style(style, |s| migrate::set_primary_font(s, font_id))
    }

    pub fn validate(&self, style: &str) -> Result<ValidationReport> {
        self.edit_style(style, validate::validate)
    }

    /// Validate every style, returning the reports of those that changed.
    pub fn validate_all(&self) -> Vec<(String, ValidationReport)> {
        self.style_names()
            .into_iter()
            .filter_map(|name| {
                let report = self.validate(&name).ok()?;
                (!report.is_clean()).then_some((name, report))
            })
            .collect()
    }
}

impl std::fmt::Debug for FontStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontStore")
            .field("styles", &self.style_names())
            .field("revision", &self.revision())
            .finish()
    }
}
