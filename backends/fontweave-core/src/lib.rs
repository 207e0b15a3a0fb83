// this_file: backends/fontweave-core/src/lib.rs

//! Core traits and types for the fontweave font-cascade engine.

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod traits;
pub mod types;
pub mod utils;

pub use cache::{CacheStats, SettingsCache};
pub use config::EngineConfig;
pub use diagnostics::{ResolutionDiagnostics, StackDiagnostics};
pub use error::WeaveError;
pub use traits::{FontLoader, GlyphCoverage, LoadedFont};
pub use types::{
    FallbackDefaults, FallbackLink, FallbackOverride, Font, FontId, FontMetadata, FontOrigin,
    FontProperty, FontRole, FontScales, FontScope, FontSettings, GlyphHandle, LanguageId,
    LoadStatus, ResolvedSettings, Setting, StackEntry, Style, StyleDefaults,
    SystemFallbackOverride,
};

/// Result type for fontweave operations
pub type Result<T> = std::result::Result<T, WeaveError>;
