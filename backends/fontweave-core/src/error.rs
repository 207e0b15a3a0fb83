// this_file: backends/fontweave-core/src/error.rs

//! Error types for fontweave.
//!
//! Store-mutating operations never fail on inconsistent data; they repair it
//! and report an outcome instead. The variants here cover the few genuinely
//! fatal paths: collaborator load failures, persistence parsing, and lookups
//! of styles that do not exist.

use std::fmt;
use thiserror::Error;

/// Main error type for fontweave operations.
#[derive(Error, Debug)]
pub enum WeaveError {
    /// The font-loading collaborator could not parse a resource
    #[error("Failed to load font {file_name}: {reason}")]
    FontLoad { file_name: String, reason: String },

    /// Rehydration found no binary resource for a font file
    #[error("No binary resource supplied for font file {file_name}")]
    MissingResource { file_name: String },

    /// No style with this name exists in the store
    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    /// A style with this name already exists in the store
    #[error("Style already exists: {0}")]
    DuplicateStyle(String),

    /// Snapshot written by an incompatible version
    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// JSON parsing or encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WeaveError {
    pub fn font_load(file_name: impl Into<String>, reason: impl fmt::Display) -> Self {
        WeaveError::FontLoad {
            file_name: file_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn missing_resource(file_name: impl Into<String>) -> Self {
        WeaveError::MissingResource {
            file_name: file_name.into(),
        }
    }
}
