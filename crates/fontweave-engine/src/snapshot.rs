// this_file: crates/fontweave-engine/src/snapshot.rs

//! Persistence of the style store.
//!
//! Only serialisable data is written. Glyph tables are rebuilt on load by
//! handing each font's binary resource back to a [`FontLoader`].

use crate::store::FontStore;
use crate::validate::validate_snapshot;
use fontweave_core::{
    EngineConfig, FontId, FontLoader, GlyphHandle, LoadStatus, LoadedFont, Result, Style,
    WeaveError,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to restore a store, minus the binary font resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub styles: Vec<Style>,
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

impl Snapshot {
    pub fn new(styles: Vec<Style>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            styles,
        }
    }

    /// Copy the current state of every style in `store`.
    pub fn capture(store: &FontStore) -> Self {
        Self::new(
            store
                .styles()
                .iter()
                .map(|style| (**style).clone())
                .collect(),
        )
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot, rejecting versions this build does not understand.
    pub fn from_json(json: &str) -> Result<Self> {
        let header: Header = serde_json::from_str(json)?;
        if header.version != SNAPSHOT_VERSION {
            return Err(WeaveError::UnsupportedVersion {
                found: header.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(serde_json::from_str(json)?)
    }

    /// File names of every font that needs a binary resource on load.
    pub fn file_names(&self) -> BTreeSet<String> {
        self.styles
            .iter()
            .flat_map(|style| style.fonts.iter())
            .filter_map(|font| font.file_name.clone())
            .collect()
    }
}

/// Load outcome of one font record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub style: String,
    pub font: FontId,
    pub status: LoadStatus,
}

impl LoadReport {
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, LoadStatus::Degraded(_))
    }
}

/// Rebuild a store from `snapshot`.
///
/// Each distinct file is parsed once. Fonts whose resource is missing or
/// fails to parse stay in their style with `LoadStatus::Degraded` and no
/// glyph table. Only snapshot-level problems (duplicate style names) fail.
pub fn rehydrate(
    mut snapshot: Snapshot,
    resources: &HashMap<String, Vec<u8>>,
    loader: &dyn FontLoader,
    config: &EngineConfig,
) -> Result<(FontStore, Vec<LoadReport>)> {
    if config.validate_on_load {
        validate_snapshot(&mut snapshot);
    }

    let mut loaded: HashMap<String, std::result::Result<LoadedFont, String>> = HashMap::new();
    let mut reports = Vec::new();

    for style in &mut snapshot.styles {
        for font in &mut style.fonts {
            let Some(file_name) = font.file_name.clone() else {
                font.status = LoadStatus::System;
                continue;
            };

            let outcome = loaded
                .entry(file_name.clone())
                .or_insert_with(|| load_resource(&file_name, resources, loader));
            match outcome {
                Ok(parsed) => {
                    font.glyphs = GlyphHandle::new(parsed.glyphs.clone());
                    font.metadata = Some(parsed.metadata);
                    font.status = LoadStatus::Loaded;
                }
                Err(reason) => {
                    font.status = LoadStatus::Degraded(reason.clone());
                }
            }
            reports.push(LoadReport {
                style: style.name.clone(),
                font: font.id.clone(),
                status: font.status.clone(),
            });
        }
    }

    let degraded = reports.iter().filter(|report| report.is_degraded()).count();
    log::info!(
        target: "fontweave::snapshot",
        "rehydrated {} styles with {} ({}), {degraded} fonts degraded",
        snapshot.styles.len(),
        loader.name(),
        loaded.len()
    );

    let store = FontStore::from_styles(snapshot.styles)?;
    Ok((store, reports))
}

fn load_resource(
    file_name: &str,
    resources: &HashMap<String, Vec<u8>>,
    loader: &dyn FontLoader,
) -> std::result::Result<LoadedFont, String> {
    let result = match resources.get(file_name) {
        Some(data) => loader.load(file_name, data),
        None => Err(WeaveError::missing_resource(file_name)),
    };
    result.map_err(|err| {
        log::warn!(target: "fontweave::snapshot", "{err}");
        err.to_string()
    })
}
