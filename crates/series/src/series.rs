//! Trace series: the read path entry point
//!
//! A [`TraceSeries`] owns the routing tables of one series and handles to
//! its collaborators. Queries run on the calling thread and share nothing
//! mutable; one series serves any number of concurrent queries.
//!
//! ## Query Flow
//!
//! ```text
//! fetch_trace:  trace id --index--> chunk ids --+
//!                                               +--> resolve_chunks --> entities
//! scan_entity:  time window --scan--> chunk ids +
//! ```
//!
//! Both entry points return [`Partial`] results: precondition failures are
//! `Err`, per-chunk and per-scan-line failures ride along in `errors`.

use crate::config::SeriesConfig;
use crate::projection::{self, FetchPlan};
use crate::schema::SeriesSchema;
use std::sync::Arc;
use tracestore_core::{
    ChunkIdCodec, Entity, Error, KvReader, Partial, RecordCodec, Result, ScanOptions,
    ShardAssigner, Trace,
};
use tracing::debug;

/// Read path over one sharded trace series
pub struct TraceSeries {
    pub(crate) config: SeriesConfig,
    pub(crate) schema: Arc<SeriesSchema>,
    pub(crate) reader: Arc<dyn KvReader>,
    pub(crate) shards: Arc<dyn ShardAssigner>,
    pub(crate) chunk_ids: Arc<dyn ChunkIdCodec>,
    pub(crate) records: Arc<dyn RecordCodec>,
}

impl TraceSeries {
    /// Open a series over the given collaborators
    ///
    /// Fails with `Config` if the configuration is invalid.
    pub fn new(
        config: SeriesConfig,
        reader: Arc<dyn KvReader>,
        shards: Arc<dyn ShardAssigner>,
        chunk_ids: Arc<dyn ChunkIdCodec>,
        records: Arc<dyn RecordCodec>,
    ) -> Result<Self> {
        let schema = Arc::new(SeriesSchema::from_config(&config)?);
        Ok(Self {
            config,
            schema,
            reader,
            shards,
            chunk_ids,
            records,
        })
    }

    /// Routing tables of this series
    pub fn schema(&self) -> &SeriesSchema {
        &self.schema
    }

    /// Configuration this series was opened with
    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    /// Resolve a projection into a fetch plan without touching storage
    pub fn plan_projection(&self, projection: &[String]) -> Result<FetchPlan> {
        projection::plan(&self.schema, projection)
    }

    /// Fetch every entity of a trace
    ///
    /// A trace with no index entries yields an empty trace and no errors.
    ///
    /// # Errors
    ///
    /// - `InvalidTraceId`: empty trace id, nothing read
    /// - `FieldNotFound`: unknown projected field, nothing read
    /// - `ProjectionEmpty`: chunks were found but nothing was requested
    /// - trace index read failures, as reported by the reader
    pub fn fetch_trace(
        &self,
        trace_id: impl AsRef<[u8]>,
        opts: &ScanOptions,
    ) -> Result<Partial<Trace>> {
        let trace_id = trace_id.as_ref();
        if trace_id.is_empty() {
            return Err(Error::InvalidTraceId);
        }
        let plan = self.plan_projection(&opts.projection)?;

        let Partial {
            value: chunk_ids,
            mut errors,
        } = self.resolve_trace_id(trace_id)?;
        if chunk_ids.is_empty() {
            return Ok(Partial::new(Trace::empty(), errors));
        }

        let resolved = self.resolve_chunks(&chunk_ids, &plan)?;
        errors.append(resolved.errors);
        Ok(Partial::new(Trace::new(resolved.value), errors))
    }

    /// Fetch entities whose start time lies in `[start_time, end_time]`
    ///
    /// Scans every shard for each state selected by `opts.state`, capped
    /// cooperatively at `opts.limit` (see [`TraceSeries::scan_chunk_ids`]).
    ///
    /// # Errors
    ///
    /// - `FieldNotFound`: unknown projected field, nothing read
    /// - `ProjectionEmpty`: nothing was requested, nothing read
    pub fn scan_entity(
        &self,
        start_time: u64,
        end_time: u64,
        opts: &ScanOptions,
    ) -> Result<Partial<Vec<Entity>>> {
        let plan = self.plan_projection(&opts.projection)?;
        if plan.is_empty() {
            return Err(Error::ProjectionEmpty);
        }

        let Partial {
            value: chunk_ids,
            mut errors,
        } = self.scan_chunk_ids(start_time, end_time, opts);
        debug!(
            start_time,
            end_time,
            chunk_num = chunk_ids.len(),
            error_num = errors.len(),
            "scan entity by time range"
        );
        if chunk_ids.is_empty() {
            return Ok(Partial::new(Vec::new(), errors));
        }

        let resolved = self.resolve_chunks(&chunk_ids, &plan)?;
        errors.append(resolved.errors);
        Ok(Partial::new(resolved.value, errors))
    }

    /// Encode an entity into the wire format of this series
    pub fn encode_entity(&self, entity: &Entity) -> Result<Vec<u8>> {
        self.records.encode_entity(entity)
    }
}

impl std::fmt::Debug for TraceSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceSeries")
            .field("shard_num", &self.schema.shard_num())
            .field("fields", &self.schema.field_names())
            .field("scan_mode", &self.config.scan_mode)
            .finish()
    }
}
