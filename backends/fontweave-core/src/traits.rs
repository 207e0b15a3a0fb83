// this_file: backends/fontweave-core/src/traits.rs

//! Collaborator traits implemented outside the engine.

use crate::types::FontMetadata;
use crate::Result;
use std::sync::Arc;

/// Glyph-coverage capability of a font with a loaded glyph table.
pub trait GlyphCoverage: Send + Sync {
    /// Whether the font maps `ch` to a real (non-`.notdef`) glyph.
    fn has_glyph(&self, ch: char) -> bool;
}

/// A font parsed by a [`FontLoader`].
#[derive(Clone)]
pub struct LoadedFont {
    pub glyphs: Arc<dyn GlyphCoverage>,
    pub metadata: FontMetadata,
}

/// Turns a binary font resource into a glyph-coverage capability.
pub trait FontLoader {
    /// Parse `data`. Failures are reported as [`crate::WeaveError::FontLoad`].
    fn load(&self, file_name: &str, data: &[u8]) -> Result<LoadedFont>;

    /// Loader name for diagnostics
    fn name(&self) -> &str;
}
