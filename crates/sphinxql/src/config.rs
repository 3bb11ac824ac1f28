//! Configuration.
//!
//! Everything has a working default; a TOML document only needs the keys it
//! wants to change.
//!
//! ```toml
//! [defaults]
//! limit = 50
//!
//! [monitor]
//! enabled = true
//! record_stats = true
//! slow_query_threshold_ms = 250
//! ```

use crate::error::QlResult;
use crate::monitor::MonitorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Values a builder resets its options to after every compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderDefaults {
    /// LIMIT offset
    pub offset: u64,
    /// LIMIT row count
    pub limit: u64,
    /// OPTION max_matches
    pub max_matches: u64,
}

impl Default for BuilderDefaults {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
            max_matches: 1000,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Builder option defaults
    pub defaults: BuilderDefaults,
    /// Execution monitoring
    pub monitor: MonitorConfig,
}

impl Config {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> QlResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> QlResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            crate::QlError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }
}
