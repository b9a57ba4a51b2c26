//! Public types for the tracestore API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// Query and result types
pub use tracestore_core::{
    ChunkId, Entity, Field, FieldValue, KindVersion, ScanOptions, State, Trace, TraceState,
    DATA_BINARY_FIELD_NAME, DEFAULT_LIMIT, TRACE_KIND_VERSION,
};

// Partial failure handling
pub use tracestore_core::{ErrorList, Partial};

// Collaborator traits, for plugging in a custom engine or codec
pub use tracestore_core::{
    ChunkIdCodec, EntityRecord, KvReader, ReadScope, RecordCodec, ScanOpts, ShardAssigner, Visit,
};

// Series configuration
pub use tracestore_series::{FetchPlan, ScanMode, SeriesConfig, TraceSeries};

// Bundled collaborators
pub use tracestore_storage::{
    MemoryStore, MemoryStoreOptions, MsgPackCodec, SnowflakeCodec, XxHashAssigner,
};
