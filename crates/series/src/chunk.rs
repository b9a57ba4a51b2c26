//! Chunk resolution
//!
//! A chunk id names one stored entity. Resolving it takes two hops:
//!
//! 1. the chunk-id codec yields the shard and write timestamp
//! 2. the mapping table on that shard, read at that timestamp, yields the
//!    internal reference: `state (1) | series id (N) | ts suffix (8)`
//!
//! The reference then drives [`TraceSeries::materialize`]. Each chunk fails
//! on its own; a batch always returns every chunk that did resolve, in
//! input order.

use crate::projection::FetchPlan;
use crate::schema::CHUNK_ID_MAPPING;
use crate::series::TraceSeries;
use chrono::{TimeZone, Utc};
use tracestore_core::{
    ChunkId, Entity, Error, ErrorList, Partial, ReadScope, Result, ScanOptions,
};
use tracing::{debug, warn};

const TS_SUFFIX_LEN: usize = 8;

/// Decoded mapping table value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalRef {
    /// Raw state byte
    pub state: u8,
    /// Series id the entity's columns are keyed by
    pub series_id: Vec<u8>,
}

impl InternalRef {
    /// Parse `state | series id | ts suffix`
    ///
    /// The value must hold at least one series id byte.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() <= 1 + TS_SUFFIX_LEN {
            return Err(Error::InvalidInternalRef { len: raw.len() });
        }
        let body = &raw[..raw.len() - TS_SUFFIX_LEN];
        Ok(Self {
            state: body[0],
            series_id: body[1..].to_vec(),
        })
    }
}

impl TraceSeries {
    /// Resolve caller-supplied chunk ids into entities
    ///
    /// # Errors
    ///
    /// - `ChunkIdsEmpty`: no chunk ids given
    /// - `FieldNotFound`: unknown projected field
    /// - `ProjectionEmpty`: nothing requested
    pub fn fetch_entity(
        &self,
        chunk_ids: &[ChunkId],
        opts: &ScanOptions,
    ) -> Result<Partial<Vec<Entity>>> {
        if chunk_ids.is_empty() {
            return Err(Error::ChunkIdsEmpty);
        }
        let plan = self.plan_projection(&opts.projection)?;
        self.resolve_chunks(chunk_ids, &plan)
    }

    pub(crate) fn resolve_chunks(
        &self,
        chunk_ids: &[ChunkId],
        plan: &FetchPlan,
    ) -> Result<Partial<Vec<Entity>>> {
        if chunk_ids.is_empty() {
            return Err(Error::ChunkIdsEmpty);
        }
        if plan.is_empty() {
            return Err(Error::ProjectionEmpty);
        }

        let mut entities = Vec::with_capacity(chunk_ids.len());
        let mut errors = ErrorList::new();
        for &chunk_id in chunk_ids {
            match self.resolve_chunk(chunk_id, plan) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(chunk_id = chunk_id.as_u64(), error = %e, "failed to resolve chunk");
                    errors.push(e);
                }
            }
        }
        Ok(Partial::new(entities, errors))
    }

    fn resolve_chunk(&self, chunk_id: ChunkId, plan: &FetchPlan) -> Result<Entity> {
        let raw_id = chunk_id.as_u64();
        let shard = self
            .chunk_ids
            .parse_shard(raw_id)
            .map_err(|e| e.for_chunk(raw_id))?;
        let ts = self
            .chunk_ids
            .parse_ts(raw_id)
            .map_err(|e| e.for_chunk(raw_id))?;

        let raw_ref = self
            .reader
            .get(
                &ReadScope::at(shard, CHUNK_ID_MAPPING, ts),
                &chunk_id.to_bytes(),
            )
            .map_err(|e| e.for_chunk(raw_id))?;
        let internal = InternalRef::parse(&raw_ref).map_err(|e| e.for_chunk(raw_id))?;
        debug!(
            chunk_id = raw_id,
            shard_id = shard,
            state = internal.state,
            series_id = %hex::encode(&internal.series_id),
            ts_nano = ts,
            ts = %Utc.timestamp_nanos(ts as i64).to_rfc3339(),
            "fetch internal id by chunk_id"
        );

        let entity = self
            .materialize(shard, &internal, ts, plan)
            .map_err(|e| e.for_chunk(raw_id))?;
        debug!(
            chunk_id = raw_id,
            entity_id = %hex::encode(&entity.entity_id),
            fields_num = entity.fields_len(),
            data_binary_size_bytes = entity.data_binary_len(),
            "fetched entity"
        );
        Ok(entity)
    }
}
