//! Trace id index lookup
//!
//! The trace index lives on the shard the trace id hashes to. Each trace id
//! key holds one 8-byte big-endian chunk id per stored chunk, in write order.

use crate::schema::TRACE_INDEX;
use crate::series::TraceSeries;
use tracestore_core::{ChunkId, Error, ErrorList, Partial, ReadScope, Result};
use tracing::{debug, warn};

impl TraceSeries {
    /// Chunk ids stored under `trace_id`, in index order
    ///
    /// An empty list means the trace does not exist. Values that are not
    /// 8 bytes wide are reported as `InvalidKey` and left out.
    pub fn resolve_trace_id(&self, trace_id: &[u8]) -> Result<Partial<Vec<ChunkId>>> {
        if trace_id.is_empty() {
            return Err(Error::InvalidTraceId);
        }
        let shard = self.shards.shard_id(trace_id, self.schema.shard_num());
        let values = self
            .reader
            .get_all(&ReadScope::unbounded(shard, TRACE_INDEX), trace_id)?;
        debug!(
            shard_id = shard,
            trace_id = %String::from_utf8_lossy(trace_id),
            trace_id_bytes = %hex::encode(trace_id),
            chunk_num = values.len(),
            "fetch trace by trace_id"
        );

        let mut chunk_ids = Vec::with_capacity(values.len());
        let mut errors = ErrorList::new();
        for value in values {
            match ChunkId::from_bytes(&value) {
                Ok(id) => chunk_ids.push(id),
                Err(e) => {
                    warn!(error = %e, "malformed trace index value");
                    errors.push(e);
                }
            }
        }
        Ok(Partial::new(chunk_ids, errors))
    }
}
