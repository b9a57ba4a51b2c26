//! Convenient imports for tracestore.
//!
//! ```ignore
//! use tracestore::prelude::*;
//!
//! let store = TraceStore::builder().fields(["service"]).open()?;
//! let trace = store.fetch_by_trace_id("t1", &ScanOptions::new().with_projection(["service"]))?;
//! ```

// Main entry point
pub use crate::database::{TraceStore, TraceStoreBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Query types
pub use crate::types::{ChunkId, Entity, FieldValue, Partial, ScanOptions, Trace, TraceState};

// Configuration
pub use crate::types::{ScanMode, SeriesConfig};
