//! Read path of a sharded trace series
//!
//! A trace series stores entities (spans) in per-state column stores and
//! indexes them two ways: by trace id, and by `[state][start time]`. This
//! crate answers the two queries those indexes support:
//!
//! - [`TraceSeries::fetch_trace`]: every entity of one trace
//! - [`TraceSeries::scan_entity`]: entities in a time window, optionally
//!   filtered by state, capped by a cooperative limit
//!
//! # Architecture
//!
//! ```text
//! projection --> FetchPlan
//! index / scan --> chunk ids --> mapping table --> InternalRef
//!                                                   |
//!                    fields store + data store <----+--> Entity
//! ```
//!
//! Storage, shard assignment, chunk-id parsing and record decoding are
//! reached only through the traits in `tracestore_core::traits`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod config;
pub mod index;
mod materialize;
pub mod projection;
pub mod scan;
pub mod schema;
pub mod series;

pub use chunk::InternalRef;
pub use config::{ScanMode, SeriesConfig};
pub use projection::FetchPlan;
pub use scan::{index_key, seek_key, KEY_PREFIX_LEN};
pub use schema::{
    SeriesSchema, StoreNames, CHUNK_ID_MAPPING, ERROR_DATA_STORE, ERROR_FIELDS_STORE,
    START_TIME_INDEX, SUCCESS_DATA_STORE, SUCCESS_FIELDS_STORE, TRACE_INDEX,
};
pub use series::TraceSeries;
