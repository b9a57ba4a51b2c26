//! Core types for the trace read path
//!
//! This module defines the values that flow through a query:
//! - [`ChunkId`]: identifier linking index entries to one series record
//! - [`State`]: outcome classification selecting the column stores
//! - [`ScanOptions`]: limit, state filter and projection of a query
//! - [`Entity`] / [`Trace`]: materialized output

use crate::error::{Error, Result};
use crate::value::FieldValue;
use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};

/// Reserved projection name requesting the opaque data binary
pub const DATA_BINARY_FIELD_NAME: &str = "data_binary";

/// Effective limit when `ScanOptions::limit` is unset
pub const DEFAULT_LIMIT: u32 = 10;

/// Identifier of one chunk of trace data
///
/// Decomposable into a shard and a timestamp by a
/// [`ChunkIdCodec`](crate::traits::ChunkIdCodec). Stored big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkId(pub u64);

impl ChunkId {
    /// Encoded width in bytes
    pub const SIZE: usize = 8;

    /// Big-endian encoding used as mapping-table key
    pub fn to_bytes(self) -> [u8; 8] {
        let mut buf = [0u8; 8];
        BigEndian::write_u64(&mut buf, self.0);
        buf
    }

    /// Decode an exactly 8-byte big-endian value
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(Error::invalid_key(bytes));
        }
        Ok(ChunkId(BigEndian::read_u64(bytes)))
    }

    /// Raw value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for ChunkId {
    fn from(v: u64) -> Self {
        ChunkId(v)
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Completion state of a trace entity
///
/// Encoded as a single byte in index keys and mapping-table values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    /// Completed successfully
    Success,
    /// Completed with an error
    Error,
}

impl State {
    /// Byte value of `Success`
    pub const SUCCESS_BYTE: u8 = 0;
    /// Byte value of `Error`
    pub const ERROR_BYTE: u8 = 1;

    /// Single-byte encoding
    pub fn as_byte(self) -> u8 {
        match self {
            State::Success => Self::SUCCESS_BYTE,
            State::Error => Self::ERROR_BYTE,
        }
    }

    /// Decode a state byte
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            Self::SUCCESS_BYTE => Ok(State::Success),
            Self::ERROR_BYTE => Ok(State::Error),
            other => Err(Error::UnsupportedState(other)),
        }
    }
}

/// State filter of a range scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceState {
    /// Both states
    #[default]
    Default,
    /// Success only
    Success,
    /// Error only
    Error,
}

impl TraceState {
    /// States to scan, in scan order
    pub fn states(self) -> &'static [State] {
        match self {
            TraceState::Default => &[State::Success, State::Error],
            TraceState::Success => &[State::Success],
            TraceState::Error => &[State::Error],
        }
    }
}

/// Query options shared by fetch-by-trace and range scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Result cap; 0 means unset
    pub limit: u32,
    /// State filter
    pub state: TraceState,
    /// Requested output field names
    pub projection: Vec<String>,
}

impl ScanOptions {
    /// Options with no limit, both states and no projection
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the result cap
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the state filter
    pub fn with_state(mut self, state: TraceState) -> Self {
        self.state = state;
        self
    }

    /// Set the projection
    pub fn with_projection<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = names.into_iter().map(Into::into).collect();
        self
    }

    /// Limit to apply, falling back to `default` when unset
    pub fn effective_limit(&self, default: u32) -> u32 {
        if self.limit < 1 {
            default
        } else {
            self.limit
        }
    }
}

/// Field name resolved to its ordinal in the record schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldEntry {
    /// Output name
    pub name: String,
    /// Ordinal within the stored record
    pub index: usize,
}

impl FieldEntry {
    /// Create an entry
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// Named field of an output entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field value
    pub value: FieldValue,
}

impl Field {
    /// Create a field
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One materialized record
///
/// `fields` and `data_binary` are `None` when not requested, so they are
/// absent from the encoded form rather than present but empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity identifier
    pub entity_id: Vec<u8>,
    /// Timestamp in nanoseconds
    pub timestamp_nanos: u64,
    /// Projected fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
    /// Opaque payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_binary: Option<Vec<u8>>,
}

impl Entity {
    /// Number of projected fields
    pub fn fields_len(&self) -> usize {
        self.fields.as_ref().map_or(0, Vec::len)
    }

    /// Size of the data binary in bytes
    pub fn data_binary_len(&self) -> usize {
        self.data_binary.as_ref().map_or(0, Vec::len)
    }

    /// Look up a projected field by name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .as_ref()?
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }
}

/// Kind and version tag carried by every trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindVersion {
    /// Kind name
    pub kind: &'static str,
    /// Version name
    pub version: &'static str,
}

/// Kind/version of [`Trace`]
pub const TRACE_KIND_VERSION: KindVersion = KindVersion {
    kind: "trace",
    version: "v1",
};

/// Entities returned for one trace id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// Always [`TRACE_KIND_VERSION`]
    pub kind_version: KindVersion,
    /// Materialized entities in chunk order
    pub entities: Vec<Entity>,
}

impl Trace {
    /// Wrap entities
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            kind_version: TRACE_KIND_VERSION,
            entities,
        }
    }

    /// Trace with no entities
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Check if nothing was found
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::empty()
    }
}
