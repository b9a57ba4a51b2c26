//! Collaborator interfaces consumed by the read path
//!
//! The read path never touches storage, hashing or record encoding directly.
//! It goes through these traits so that the storage engine, shard function,
//! chunk-id generator and record codec can be swapped independently.
//!
//! All implementations must be `Send + Sync`: a store is opened once and
//! shared by every query.

use crate::error::Result;
use crate::types::Entity;
use crate::value::EntityRecord;

/// Deterministic shard selection
pub trait ShardAssigner: Send + Sync {
    /// Shard in `0..shard_num` owning `key`
    fn shard_id(&self, key: &[u8], shard_num: u32) -> u32;
}

/// Decomposes chunk ids into shard and timestamp
pub trait ChunkIdCodec: Send + Sync {
    /// Shard the chunk was written to
    fn parse_shard(&self, chunk_id: u64) -> Result<u32>;

    /// Write timestamp of the chunk, in nanoseconds
    fn parse_ts(&self, chunk_id: u64) -> Result<u64>;
}

/// Where a read is directed
///
/// `time_from == 0 && time_to == 0` means unbounded in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadScope<'a> {
    /// Target shard
    pub shard: u32,
    /// Target store within the shard
    pub store: &'a str,
    /// Inclusive lower time bound, nanoseconds
    pub time_from: u64,
    /// Inclusive upper time bound, nanoseconds
    pub time_to: u64,
}

impl<'a> ReadScope<'a> {
    /// Scope with explicit time bounds
    pub fn new(shard: u32, store: &'a str, time_from: u64, time_to: u64) -> Self {
        Self {
            shard,
            store,
            time_from,
            time_to,
        }
    }

    /// Scope covering all time
    pub fn unbounded(shard: u32, store: &'a str) -> Self {
        Self::new(shard, store, 0, 0)
    }

    /// Scope restricted to a single time point
    pub fn at(shard: u32, store: &'a str, ts: u64) -> Self {
        Self::new(shard, store, ts, ts)
    }

    /// Check if the scope has no time bounds
    pub fn is_unbounded(&self) -> bool {
        self.time_from == 0 && self.time_to == 0
    }
}

/// Range scan tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOpts {
    /// Load values eagerly while iterating
    pub prefetch_values: bool,
    /// Expected number of visited entries
    pub prefetch_size: usize,
    /// Iterate from the seek key downwards
    pub reverse: bool,
}

impl Default for ScanOpts {
    fn default() -> Self {
        Self {
            prefetch_values: true,
            prefetch_size: 100,
            reverse: false,
        }
    }
}

/// Visitor decision for one scanned entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Entry was used, keep going
    Continue,
    /// Entry was ignored, keep going
    Skip,
    /// End this scan without error
    Stop,
}

/// Deferred value access handed to scan visitors
pub type ValueLoader<'a> = &'a dyn Fn() -> Result<Vec<u8>>;

/// Scan visitor: key, deferred value
pub type Visitor<'a> = dyn FnMut(&[u8], ValueLoader<'_>) -> Result<Visit> + 'a;

/// Read access to the sorted key-value layer
pub trait KvReader: Send + Sync {
    /// Newest value of `key` visible in `scope`
    ///
    /// Missing keys are reported as [`Error::NotFound`](crate::Error::NotFound).
    fn get(&self, scope: &ReadScope<'_>, key: &[u8]) -> Result<Vec<u8>>;

    /// Every value of `key` visible in `scope`, in insertion order
    ///
    /// Missing keys yield an empty list.
    fn get_all(&self, scope: &ReadScope<'_>, key: &[u8]) -> Result<Vec<Vec<u8>>>;

    /// Value of `key` written exactly at `ts`
    fn get_at(&self, scope: &ReadScope<'_>, key: &[u8], ts: u64) -> Result<Vec<u8>>;

    /// Visit keys from `seek` onwards in key order until the visitor stops
    /// or the keys run out
    fn scan(
        &self,
        scope: &ReadScope<'_>,
        seek: &[u8],
        opts: &ScanOpts,
        visit: &mut Visitor<'_>,
    ) -> Result<()>;
}

/// Binary encoding of stored records and output entities
pub trait RecordCodec: Send + Sync {
    /// Decode a fields-store record
    fn decode_record(&self, raw: &[u8]) -> Result<EntityRecord>;

    /// Encode a fields-store record
    fn encode_record(&self, record: &EntityRecord) -> Result<Vec<u8>>;

    /// Encode an output entity into the wire format
    fn encode_entity(&self, entity: &Entity) -> Result<Vec<u8>>;

    /// Decode an output entity from the wire format
    fn decode_entity(&self, raw: &[u8]) -> Result<Entity>;
}
