// this_file: backends/fontweave-core/src/diagnostics.rs

//! Resolution diagnostics helpers used for structured debug logging.

use crate::types::{FontId, LanguageId, ResolvedSettings, StackEntry};
use log::{debug, log_enabled, Level};

/// Lightweight snapshot of one effective-settings resolution.
#[derive(Debug)]
pub struct ResolutionDiagnostics<'a> {
    style: &'a str,
    font: &'a FontId,
    ancestor: Option<&'a FontId>,
    settings: &'a ResolvedSettings,
}

impl<'a> ResolutionDiagnostics<'a> {
    pub fn new(
        style: &'a str,
        font: &'a FontId,
        ancestor: Option<&'a FontId>,
        settings: &'a ResolvedSettings,
    ) -> Self {
        Self {
            style,
            font,
            ancestor,
            settings,
        }
    }

    /// Emit the snapshot at debug level when logging is enabled.
    pub fn log(&self) {
        if log_enabled!(target: "fontweave::resolve", Level::Debug) {
            debug!(
                target: "fontweave::resolve",
                "style={style} font={font} ancestor={ancestor} scale={scale:.1} line_height={line_height:.2} letter_spacing={letter_spacing:.2} weight={weight} hidden={hidden}",
                style = self.style,
                font = self.font,
                ancestor = self.ancestor.map(FontId::as_str).unwrap_or("<none>"),
                scale = self.settings.scale,
                line_height = self.settings.line_height,
                letter_spacing = self.settings.letter_spacing,
                weight = self.settings.weight,
                hidden = self.settings.hidden,
            );
        }
    }
}

/// Lightweight snapshot of a built fallback stack.
#[derive(Debug)]
pub struct StackDiagnostics<'a> {
    style: &'a str,
    language: &'a LanguageId,
    entries: &'a [StackEntry],
}

impl<'a> StackDiagnostics<'a> {
    pub fn new(style: &'a str, language: &'a LanguageId, entries: &'a [StackEntry]) -> Self {
        Self {
            style,
            language,
            entries,
        }
    }

    /// Comma-separated family aliases in stack order
    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.family_alias.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Emit the snapshot at debug level when logging is enabled.
    pub fn log(&self) {
        if log_enabled!(target: "fontweave::stack", Level::Debug) {
            debug!(
                target: "fontweave::stack",
                "style={style} language={language} entries={count} stack=[{stack}]",
                style = self.style,
                language = self.language,
                count = self.entries.len(),
                stack = self.summary(),
            );
        }
    }
}
