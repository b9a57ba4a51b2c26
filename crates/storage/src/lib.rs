//! Storage collaborators for tracestore
//!
//! This crate bundles reference implementations of the traits the read path
//! consumes:
//! - [`MemoryStore`]: sharded, time-blocked, sorted in-memory key-value store
//! - [`SnowflakeCodec`]: chunk id generation and parsing
//! - [`XxHashAssigner`]: deterministic shard assignment
//! - [`MsgPackCodec`]: record and entity encoding

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk_id;
pub mod record;
pub mod shard;
pub mod sharded;

pub use chunk_id::{SnowflakeCodec, DEFAULT_EPOCH_MILLIS, MAX_SHARDS};
pub use record::MsgPackCodec;
pub use shard::XxHashAssigner;
pub use sharded::{MemoryStore, MemoryStoreOptions, Shard};
