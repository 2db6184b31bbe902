use std::path::Path;

use serde::{Deserialize, Serialize};
use tidelog_parser::ParserLimits;
use tracing::debug;

use crate::error::Result;

/// Engine settings read from a TOML file. Everything is optional:
///
/// ```toml
/// [limits]
/// date_sample_size = 40
/// max_reported_row_errors = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub limits: ParserLimits,
}

impl EngineConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str::<EngineConfig>(toml_str)?)
    }

    /// Reads `path`, or returns the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), limits = ?config.limits, "loaded engine config");
        Ok(config)
    }
}
