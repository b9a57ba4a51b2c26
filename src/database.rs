//! Main entry point for tracestore.
//!
//! This module provides [`TraceStore`], a read path wired to its storage,
//! sharding, chunk-id and record collaborators.

use crate::error::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracestore_core::{
    ChunkId, ChunkIdCodec, Entity, KvReader, Partial, RecordCodec, ScanOptions, ShardAssigner,
    Trace,
};
use tracestore_series::{ScanMode, SeriesConfig, TraceSeries};
use tracestore_storage::{
    MemoryStore, MemoryStoreOptions, MsgPackCodec, SnowflakeCodec, XxHashAssigner,
};
use tracing::info;

/// A trace store.
///
/// Create one with [`TraceStore::ephemeral`] or [`TraceStore::builder`].
///
/// # Example
///
/// ```ignore
/// use tracestore::prelude::*;
///
/// let store = TraceStore::builder()
///     .fields(["service", "duration"])
///     .shard_num(4)
///     .open()?;
///
/// let trace = store.fetch_by_trace_id("t1", &ScanOptions::new().with_projection(["service"]))?;
/// for entity in &trace.value.entities {
///     println!("{:?}", entity.field("service"));
/// }
/// ```
pub struct TraceStore {
    series: TraceSeries,
    /// Set when the bundled memory store backs this store
    storage: Option<Arc<MemoryStore>>,
    /// Set when the bundled chunk-id codec is in use
    snowflake: Option<Arc<SnowflakeCodec>>,
}

impl TraceStore {
    /// Open a store with default settings and no fields.
    ///
    /// Only the data binary can be projected from such a store.
    pub fn ephemeral() -> Result<Self> {
        Self::builder().open()
    }

    /// Open a store configured by a TOML file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().config_file(path)?.open()
    }

    /// Create a builder for store configuration.
    pub fn builder() -> TraceStoreBuilder {
        TraceStoreBuilder::new()
    }

    /// Fetch every entity of a trace.
    ///
    /// See [`TraceSeries::fetch_trace`].
    pub fn fetch_by_trace_id(
        &self,
        trace_id: impl AsRef<[u8]>,
        opts: &ScanOptions,
    ) -> Result<Partial<Trace>> {
        Ok(self.series.fetch_trace(trace_id, opts)?)
    }

    /// Fetch entities whose start time lies in `[start_time, end_time]`.
    ///
    /// See [`TraceSeries::scan_entity`].
    pub fn fetch_by_time_range(
        &self,
        start_time: u64,
        end_time: u64,
        opts: &ScanOptions,
    ) -> Result<Partial<Vec<Entity>>> {
        Ok(self.series.scan_entity(start_time, end_time, opts)?)
    }

    /// Resolve chunk ids directly.
    pub fn fetch_entity(
        &self,
        chunk_ids: &[ChunkId],
        opts: &ScanOptions,
    ) -> Result<Partial<Vec<Entity>>> {
        Ok(self.series.fetch_entity(chunk_ids, opts)?)
    }

    /// Encode an entity into the wire format.
    pub fn encode_entity(&self, entity: &Entity) -> Result<Vec<u8>> {
        Ok(self.series.encode_entity(entity)?)
    }

    /// The underlying series.
    pub fn series(&self) -> &TraceSeries {
        &self.series
    }

    /// Configuration this store was opened with.
    pub fn config(&self) -> &SeriesConfig {
        self.series.config()
    }

    /// The bundled memory store, unless a custom reader was supplied.
    pub fn storage(&self) -> Option<&MemoryStore> {
        self.storage.as_deref()
    }

    /// The bundled chunk-id codec, unless a custom one was supplied.
    pub fn chunk_id_codec(&self) -> Option<&SnowflakeCodec> {
        self.snowflake.as_deref()
    }
}

impl std::fmt::Debug for TraceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceStore")
            .field("series", &self.series)
            .field("bundled_storage", &self.storage.is_some())
            .finish()
    }
}

/// Builder for store configuration.
///
/// Any collaborator left unset falls back to the bundled implementation:
/// [`MemoryStore`], [`XxHashAssigner`], [`SnowflakeCodec`], [`MsgPackCodec`].
///
/// # Example
///
/// ```ignore
/// // From code
/// let store = TraceStore::builder()
///     .fields(["service", "duration"])
///     .scan_mode(ScanMode::Parallel)
///     .default_limit(50)
///     .open()?;
///
/// // From a file, with a custom reader
/// let store = TraceStore::builder()
///     .config_file("series.toml")?
///     .reader(my_reader)
///     .open()?;
/// ```
#[derive(Default)]
pub struct TraceStoreBuilder {
    config: SeriesConfig,
    reader: Option<Arc<dyn KvReader>>,
    shards: Option<Arc<dyn ShardAssigner>>,
    chunk_ids: Option<Arc<dyn ChunkIdCodec>>,
    records: Option<Arc<dyn RecordCodec>>,
}

impl TraceStoreBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SeriesConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from a TOML file.
    ///
    /// An unreadable file is [`Error::Io`]; bad contents are [`Error::Config`].
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        self.config = SeriesConfig::from_toml_str(&text)?;
        Ok(self)
    }

    /// Set the number of shards.
    pub fn shard_num(mut self, shard_num: u32) -> Self {
        self.config.shard_num = shard_num;
        self
    }

    /// Set the field names, in ordinal order.
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.fields = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the limit used when a query leaves it unset.
    pub fn default_limit(mut self, limit: u32) -> Self {
        self.config.default_limit = limit;
        self
    }

    /// Set how range-scan lines are executed.
    pub fn scan_mode(mut self, mode: ScanMode) -> Self {
        self.config.scan_mode = mode;
        self
    }

    /// Set the time block width of the bundled memory store, in seconds.
    pub fn block_duration_secs(mut self, secs: u64) -> Self {
        self.config.block_duration_secs = secs;
        self
    }

    /// Read from a custom storage engine.
    pub fn reader(mut self, reader: Arc<dyn KvReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Use a custom shard function.
    pub fn shard_assigner(mut self, shards: Arc<dyn ShardAssigner>) -> Self {
        self.shards = Some(shards);
        self
    }

    /// Use a custom chunk-id codec.
    pub fn chunk_id_codec(mut self, codec: Arc<dyn ChunkIdCodec>) -> Self {
        self.chunk_ids = Some(codec);
        self
    }

    /// Use a custom record codec.
    pub fn record_codec(mut self, codec: Arc<dyn RecordCodec>) -> Self {
        self.records = Some(codec);
        self
    }

    /// Open the store.
    pub fn open(self) -> Result<TraceStore> {
        let config = self.config;
        config.validate().map_err(Error::from)?;

        let (reader, storage) = match self.reader {
            Some(reader) => (reader, None),
            None => {
                let store = Arc::new(MemoryStore::with_options(MemoryStoreOptions {
                    block_duration: Duration::from_secs(config.block_duration_secs),
                }));
                (store.clone() as Arc<dyn KvReader>, Some(store))
            }
        };
        let (chunk_ids, snowflake) = match self.chunk_ids {
            Some(codec) => (codec, None),
            None => {
                let codec = Arc::new(SnowflakeCodec::new(config.shard_num));
                (codec.clone() as Arc<dyn ChunkIdCodec>, Some(codec))
            }
        };
        let shards = self.shards.unwrap_or_else(|| Arc::new(XxHashAssigner));
        let records = self.records.unwrap_or_else(|| Arc::new(MsgPackCodec));

        info!(
            shard_num = config.shard_num,
            fields = ?config.fields,
            scan_mode = ?config.scan_mode,
            default_limit = config.default_limit,
            bundled_storage = storage.is_some(),
            "opening trace store"
        );
        let series = TraceSeries::new(config, reader, shards, chunk_ids, records)?;
        Ok(TraceStore {
            series,
            storage,
            snowflake,
        })
    }
}
