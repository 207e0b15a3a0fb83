// this_file: backends/fontweave-ttf/src/lib.rs

//! TrueType/OpenType loading backend.
//!
//! Parses uploaded font files into a glyph-coverage capability and the
//! weight metadata the settings UI needs.

use fontweave_core::{FontLoader, FontMetadata, GlyphCoverage, LoadedFont, Result, WeaveError};
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use std::sync::Arc;
use ttf_parser::Tag;

const WEIGHT_AXIS: Tag = Tag::from_bytes(b"wght");

/// Glyph coverage backed by an owned, parsed face
pub struct TtfCoverage {
    face: OwnedFace,
}

impl TtfCoverage {
    pub fn new(data: Vec<u8>, face_index: u32) -> std::result::Result<Self, String> {
        let face = OwnedFace::from_vec(data, face_index).map_err(|e| e.to_string())?;
        Ok(Self { face })
    }

    pub fn metadata(&self) -> FontMetadata {
        let face = self.face.as_face_ref();
        let weight_axis_range = face
            .variation_axes()
            .into_iter()
            .find(|axis| axis.tag == WEIGHT_AXIS)
            .map(|axis| (axis.min_value, axis.max_value));

        FontMetadata {
            is_variable: face.is_variable(),
            weight_axis_range,
            static_weight: weight_axis_range
                .is_none()
                .then(|| face.weight().to_number()),
        }
    }
}

impl GlyphCoverage for TtfCoverage {
    fn has_glyph(&self, ch: char) -> bool {
        self.face
            .as_face_ref()
            .glyph_index(ch)
            .is_some_and(|glyph| glyph.0 != 0)
    }
}

/// Font loader for TrueType/OpenType files and collections
#[derive(Debug, Clone, Default)]
pub struct TtfLoader {
    face_index: u32,
}

impl TtfLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific face of a font collection
    pub fn with_face_index(face_index: u32) -> Self {
        Self { face_index }
    }
}

impl FontLoader for TtfLoader {
    fn load(&self, file_name: &str, data: &[u8]) -> Result<LoadedFont> {
        let coverage = TtfCoverage::new(data.to_vec(), self.face_index)
            .map_err(|reason| WeaveError::font_load(file_name, reason))?;
        let metadata = coverage.metadata();
        log::debug!(
            target: "fontweave::load",
            "loaded {file_name}: variable={} weight_axis={:?} static_weight={:?}",
            metadata.is_variable,
            metadata.weight_axis_range,
            metadata.static_weight,
        );
        Ok(LoadedFont {
            glyphs: Arc::new(coverage),
            metadata,
        })
    }

    fn name(&self) -> &str {
        "ttf-parser"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_name() {
        assert_eq!(TtfLoader::new().name(), "ttf-parser");
    }

    #[test]
    fn test_invalid_bytes_report_load_error() {
        let _ = env_logger::builder().is_test(true).try_init();
        let loader = TtfLoader::new();
        let err = loader
            .load("broken.ttf", &[0u8; 64])
            .err()
            .expect("garbage must not parse");
        match err {
            WeaveError::FontLoad { file_name, .. } => assert_eq!(file_name, "broken.ttf"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_bytes_report_load_error() {
        let loader = TtfLoader::with_face_index(0);
        assert!(loader.load("empty.otf", &[]).is_err());
    }
}
