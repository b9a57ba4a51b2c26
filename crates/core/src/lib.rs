//! Core types for tracestore
//!
//! This crate defines what every other tracestore crate agrees on:
//! - Identifiers and options: [`ChunkId`], [`State`], [`ScanOptions`]
//! - Output values: [`Entity`], [`Trace`], [`FieldValue`]
//! - Failure handling: [`Error`], [`ErrorList`], [`Partial`]
//! - Collaborator traits: [`KvReader`], [`ChunkIdCodec`], [`ShardAssigner`],
//!   [`RecordCodec`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;
pub mod value;

pub use error::{Error, ErrorList, Partial, Result};
pub use traits::{
    ChunkIdCodec, KvReader, ReadScope, RecordCodec, ScanOpts, ShardAssigner, ValueLoader, Visit,
    Visitor,
};
pub use types::{
    ChunkId, Entity, Field, FieldEntry, KindVersion, ScanOptions, State, Trace, TraceState,
    DATA_BINARY_FIELD_NAME, DEFAULT_LIMIT, TRACE_KIND_VERSION,
};
pub use value::{EntityRecord, FieldValue};
