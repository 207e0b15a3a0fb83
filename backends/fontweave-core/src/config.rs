// this_file: backends/fontweave-core/src/config.rs

//! Engine configuration.

use crate::types::StyleDefaults;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Options shared by every style the engine manages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Entries kept per memo cache (settings and stacks)
    pub cache_capacity: usize,
    /// Defaults given to newly created styles
    pub style_defaults: StyleDefaults,
    /// Run the validation pass after every rehydration
    pub validate_on_load: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 512,
            style_defaults: StyleDefaults::default(),
            validate_on_load: true,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
