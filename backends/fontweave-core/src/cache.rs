// this_file: backends/fontweave-core/src/cache.rs

//! Memoization of resolver and stack results.
//!
//! Entries are keyed by style name and revision, so replacing a style in the
//! store invalidates everything cached for it without an explicit flush.

use crate::types::{FontId, LanguageId, ResolvedSettings, StackEntry};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(512) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// Key for effective-settings lookups
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct SettingsKey {
    pub style: String,
    pub revision: u64,
    pub font: FontId,
}

/// Key for fallback-stack lookups
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct StackKey {
    pub style: String,
    pub revision: u64,
    pub language: LanguageId,
}

/// LRU cache of resolved settings and fallback stacks
pub struct SettingsCache {
    settings: Mutex<LruCache<SettingsKey, Arc<ResolvedSettings>>>,
    stacks: Mutex<LruCache<StackKey, Arc<Vec<StackEntry>>>>,
}

impl SettingsCache {
    /// Create a new cache holding up to `capacity` entries of each kind
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            settings: Mutex::new(LruCache::new(capacity)),
            stacks: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get_settings(&self, key: &SettingsKey) -> Option<Arc<ResolvedSettings>> {
        self.settings.lock().get(key).cloned()
    }

    pub fn cache_settings(
        &self,
        key: SettingsKey,
        settings: ResolvedSettings,
    ) -> Arc<ResolvedSettings> {
        let settings = Arc::new(settings);
        self.settings.lock().put(key, settings.clone());
        settings
    }

    pub fn get_stack(&self, key: &StackKey) -> Option<Arc<Vec<StackEntry>>> {
        self.stacks.lock().get(key).cloned()
    }

    pub fn cache_stack(&self, key: StackKey, stack: Vec<StackEntry>) -> Arc<Vec<StackEntry>> {
        let stack = Arc::new(stack);
        self.stacks.lock().put(key, stack.clone());
        stack
    }

    /// Clear all caches
    pub fn clear(&self) {
        self.settings.lock().clear();
        self.stacks.lock().clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let settings = self.settings.lock();
        CacheStats {
            capacity: settings.cap().get(),
            settings_count: settings.len(),
            stack_count: self.stacks.lock().len(),
        }
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY.get())
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    pub capacity: usize,
    pub settings_count: usize,
    pub stack_count: usize,
}
