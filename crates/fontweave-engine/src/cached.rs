// this_file: crates/fontweave-engine/src/cached.rs

//! Memoizing front end for the resolver and the stack builder.

use crate::resolve::{ancestor, resolve_font};
use crate::stack::build_stack;
use fontweave_core::cache::{SettingsKey, StackKey};
use fontweave_core::{
    CacheStats, EngineConfig, FontId, LanguageId, ResolutionDiagnostics, ResolvedSettings,
    SettingsCache, StackEntry, Style,
};
use std::sync::Arc;

/// Resolver that remembers results per style revision.
///
/// Styles that never went through a [`crate::FontStore`] have revision 0
/// and are resolved without touching the cache.
pub struct CachedResolver {
    cache: SettingsCache,
}

impl CachedResolver {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: SettingsCache::new(capacity),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.cache_capacity)
    }

    pub fn effective_settings(
        &self,
        style: &Style,
        font_id: &FontId,
    ) -> Option<Arc<ResolvedSettings>> {
        let key = SettingsKey {
            style: style.name.clone(),
            revision: style.revision,
            font: font_id.clone(),
        };
        if style.revision != 0 {
            if let Some(settings) = self.cache.get_settings(&key) {
                return Some(settings);
            }
        }

        let font = style.font(font_id.as_str())?;
        let settings = resolve_font(style, font);
        let ancestor = ancestor(style, font).map(|ancestor| &ancestor.id);
        ResolutionDiagnostics::new(&style.name, font_id, ancestor, &settings).log();

        if style.revision == 0 {
            return Some(Arc::new(settings));
        }
        Some(self.cache.cache_settings(key, settings))
    }

    pub fn build_stack(&self, style: &Style, language: &LanguageId) -> Arc<Vec<StackEntry>> {
        if style.revision == 0 {
            return Arc::new(build_stack(style, language));
        }

        let key = StackKey {
            style: style.name.clone(),
            revision: style.revision,
            language: language.clone(),
        };
        if let Some(stack) = self.cache.get_stack(&key) {
            return stack;
        }
        self.cache.cache_stack(key, build_stack(style, language))
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for CachedResolver {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
