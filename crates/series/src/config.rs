//! Series configuration
//!
//! Loaded once at open time, from code or from TOML:
//!
//! ```toml
//! shard_num = 4
//! fields = ["trace_id", "service", "duration"]
//! default_limit = 20
//! scan_mode = "parallel"
//! block_duration_secs = 3600
//! ```
//!
//! Field ordinals are positions in `fields`; they must match the layout
//! the writer used for stored records.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracestore_core::{Error, Result, DATA_BINARY_FIELD_NAME, DEFAULT_LIMIT};

/// How range-scan lines are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// One shard/state line after another on the calling thread
    #[default]
    Sequential,
    /// All lines at once on scoped threads sharing the limit counter
    Parallel,
}

/// Series configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Number of shards the keyspace is split into
    pub shard_num: u32,
    /// Field names in ordinal order
    pub fields: Vec<String>,
    /// Limit applied when a query leaves it unset
    pub default_limit: u32,
    /// Range-scan execution
    pub scan_mode: ScanMode,
    /// Time block width of the bundled memory store, in seconds
    pub block_duration_secs: u64,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        SeriesConfig {
            shard_num: 2,
            fields: Vec::new(),
            default_limit: DEFAULT_LIMIT,
            scan_mode: ScanMode::Sequential,
            block_duration_secs: 3600,
        }
    }
}

impl SeriesConfig {
    /// Parse from TOML text and validate
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SeriesConfig =
            toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file and validate
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Check invariants the read path relies on
    pub fn validate(&self) -> Result<()> {
        if self.shard_num == 0 {
            return Err(Error::Config("shard_num must be positive".to_string()));
        }
        if self.default_limit == 0 {
            return Err(Error::Config("default_limit must be positive".to_string()));
        }
        if self.block_duration_secs == 0 {
            return Err(Error::Config(
                "block_duration_secs must be positive".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(self.fields.len());
        for name in &self.fields {
            if name.is_empty() {
                return Err(Error::Config("field name must not be empty".to_string()));
            }
            if name == DATA_BINARY_FIELD_NAME {
                return Err(Error::Config(format!(
                    "field name {} is reserved",
                    DATA_BINARY_FIELD_NAME
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::Config(format!("duplicate field name {}", name)));
            }
        }
        Ok(())
    }
}
