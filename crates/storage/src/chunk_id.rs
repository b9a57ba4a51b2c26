//! Snowflake-style chunk id generation and parsing
//!
//! # Layout
//!
//! ```text
//! | 44 bits: millis since epoch | 10 bits: shard | 10 bits: sequence |
//! ```
//!
//! Timestamps are kept at millisecond resolution, so a chunk's parsed
//! timestamp is its write time truncated to the millisecond. Writers must
//! store chunk data under [`SnowflakeCodec::chunk_ts`] of the write time.

use std::sync::atomic::{AtomicU64, Ordering};
use tracestore_core::{ChunkId, ChunkIdCodec, Error, Result};

/// 2021-01-01T00:00:00Z in milliseconds
pub const DEFAULT_EPOCH_MILLIS: u64 = 1_609_459_200_000;

const SEQ_BITS: u32 = 10;
const SHARD_BITS: u32 = 10;
const TS_BITS: u32 = 44;
const SEQ_MASK: u64 = (1 << SEQ_BITS) - 1;
const SHARD_MASK: u64 = (1 << SHARD_BITS) - 1;
const MAX_DELTA_MILLIS: u64 = (1 << TS_BITS) - 1;
const NANOS_PER_MILLI: u64 = 1_000_000;

/// Largest shard count a chunk id can address
pub const MAX_SHARDS: u32 = 1 << SHARD_BITS;

/// Chunk id generator and parser bound to a shard count
#[derive(Debug)]
pub struct SnowflakeCodec {
    shard_num: u32,
    epoch_millis: u64,
    sequence: AtomicU64,
}

impl SnowflakeCodec {
    /// Codec for `shard_num` shards using [`DEFAULT_EPOCH_MILLIS`]
    pub fn new(shard_num: u32) -> Self {
        Self::with_epoch(shard_num, DEFAULT_EPOCH_MILLIS)
    }

    /// Codec with an explicit epoch
    pub fn with_epoch(shard_num: u32, epoch_millis: u64) -> Self {
        Self {
            shard_num,
            epoch_millis,
            sequence: AtomicU64::new(0),
        }
    }

    /// Shard count this codec accepts
    pub fn shard_num(&self) -> u32 {
        self.shard_num
    }

    /// Timestamp a chunk written at `ts_nanos` parses back to
    pub fn chunk_ts(ts_nanos: u64) -> u64 {
        ts_nanos - ts_nanos % NANOS_PER_MILLI
    }

    /// Allocate a chunk id for `shard` at `ts_nanos`
    pub fn generate(&self, shard: u32, ts_nanos: u64) -> Result<ChunkId> {
        if shard >= self.shard_num || shard >= MAX_SHARDS {
            return Err(Error::Config(format!(
                "shard {} out of range 0..{}",
                shard, self.shard_num
            )));
        }
        let millis = ts_nanos / NANOS_PER_MILLI;
        let delta = millis
            .checked_sub(self.epoch_millis)
            .filter(|d| *d <= MAX_DELTA_MILLIS)
            .ok_or_else(|| Error::Config(format!("timestamp {} outside chunk id range", ts_nanos)))?;
        let seq = self.sequence.fetch_add(1, Ordering::AcqRel) & SEQ_MASK;
        let id = (delta << (SHARD_BITS + SEQ_BITS)) | (u64::from(shard) << SEQ_BITS) | seq;
        if id == 0 {
            return self.generate(shard, ts_nanos);
        }
        Ok(ChunkId(id))
    }

    fn check_non_zero(chunk_id: u64) -> Result<()> {
        if chunk_id == 0 {
            return Err(Error::InvalidChunkId {
                chunk_id,
                reason: "zero is reserved".to_string(),
            });
        }
        Ok(())
    }
}

impl ChunkIdCodec for SnowflakeCodec {
    fn parse_shard(&self, chunk_id: u64) -> Result<u32> {
        Self::check_non_zero(chunk_id)?;
        let shard = ((chunk_id >> SEQ_BITS) & SHARD_MASK) as u32;
        if shard >= self.shard_num {
            return Err(Error::InvalidChunkId {
                chunk_id,
                reason: format!("shard {} out of range 0..{}", shard, self.shard_num),
            });
        }
        Ok(shard)
    }

    fn parse_ts(&self, chunk_id: u64) -> Result<u64> {
        Self::check_non_zero(chunk_id)?;
        let delta = chunk_id >> (SHARD_BITS + SEQ_BITS);
        (delta + self.epoch_millis)
            .checked_mul(NANOS_PER_MILLI)
            .ok_or_else(|| Error::InvalidChunkId {
                chunk_id,
                reason: "timestamp overflow".to_string(),
            })
    }
}
