//! Store routing tables
//!
//! [`SeriesSchema`] is built once when a series is opened and shared by every
//! query. It answers two questions:
//! - which ordinal a field name has in stored records
//! - which (fields store, data store) pair holds entities of a given state

use crate::config::SeriesConfig;
use rustc_hash::FxHashMap;
use tracestore_core::{Result, State};

/// Secondary index: trace id -> chunk ids
pub const TRACE_INDEX: &str = "trace_id_index";
/// Time-ordered index keyed `[state][start time][chunk id]`
pub const START_TIME_INDEX: &str = "start_time_index";
/// Chunk id -> internal series reference
pub const CHUNK_ID_MAPPING: &str = "chunk_id_mapping";
/// Field records of successful entities
pub const SUCCESS_FIELDS_STORE: &str = "success_fields";
/// Field records of failed entities
pub const ERROR_FIELDS_STORE: &str = "error_fields";
/// Data binaries of successful entities
pub const SUCCESS_DATA_STORE: &str = "success_data";
/// Data binaries of failed entities
pub const ERROR_DATA_STORE: &str = "error_data";

/// Column stores holding one state's entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreNames {
    /// Field record store
    pub fields: &'static str,
    /// Data binary store
    pub data: &'static str,
}

/// Immutable routing tables of a series
#[derive(Debug, Clone)]
pub struct SeriesSchema {
    shard_num: u32,
    field_names: Vec<String>,
    field_index: FxHashMap<String, usize>,
}

impl SeriesSchema {
    /// Build from a validated configuration
    pub fn from_config(config: &SeriesConfig) -> Result<Self> {
        config.validate()?;
        let field_index = config
            .fields
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Ok(Self {
            shard_num: config.shard_num,
            field_names: config.fields.clone(),
            field_index,
        })
    }

    /// Number of shards
    pub fn shard_num(&self) -> u32 {
        self.shard_num
    }

    /// Field names in ordinal order
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Ordinal of `name`, if it is a known field
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.field_index.get(name).copied()
    }

    /// Stores holding entities in `state`
    pub fn stores_for(&self, state: State) -> StoreNames {
        match state {
            State::Success => StoreNames {
                fields: SUCCESS_FIELDS_STORE,
                data: SUCCESS_DATA_STORE,
            },
            State::Error => StoreNames {
                fields: ERROR_FIELDS_STORE,
                data: ERROR_DATA_STORE,
            },
        }
    }

    /// Stores for a raw state byte; unknown bytes are `UnsupportedState`
    pub fn stores_for_byte(&self, state: u8) -> Result<StoreNames> {
        Ok(self.stores_for(State::from_byte(state)?))
    }
}
