//! # tracestore
//!
//! Read path of a sharded time-series trace store.
//!
//! tracestore resolves a trace id, or a time window and state filter, into
//! fully materialized trace entities carrying only the fields the caller
//! asked for. It sits above a sorted key-value layer and walks three levels
//! of indirection: a secondary index, a chunk mapping table, and per-state
//! column stores.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tracestore::prelude::*;
//!
//! let store = TraceStore::builder()
//!     .fields(["service", "duration"])
//!     .open()?;
//!
//! // By trace id
//! let opts = ScanOptions::new().with_projection(["service", "data_binary"]);
//! let trace = store.fetch_by_trace_id("t1", &opts)?;
//!
//! // By time window, errors only, at most 20
//! let opts = opts.with_state(TraceState::Error).with_limit(20);
//! let page = store.fetch_by_time_range(start, end, &opts)?;
//! if !page.is_complete() {
//!     eprintln!("{}", page.errors);
//! }
//! ```
//!
//! ## Partial Results
//!
//! Rejected calls (empty trace id, unknown field, empty projection) return
//! `Err` without touching storage. Everything else returns a [`Partial`]:
//! the entities that resolved plus an [`ErrorList`] of what did not.
//!
//! ## Crates
//!
//! - `tracestore-core`: ids, entities, errors, collaborator traits
//! - `tracestore-storage`: bundled memory store and codecs
//! - `tracestore-series`: the read path itself

#![warn(missing_docs)]

mod database;
mod error;
mod types;

pub mod prelude;

pub use database::{TraceStore, TraceStoreBuilder};
pub use error::{Error, Result};
pub use types::*;
