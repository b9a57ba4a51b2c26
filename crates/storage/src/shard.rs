//! Shard assignment by xxHash64
//!
//! Keys are hashed with seed 0 and reduced modulo the shard count. The
//! mapping is pure: the same key and shard count always yield the same shard.

use tracestore_core::ShardAssigner;
use xxhash_rust::xxh64::xxh64;

/// [`ShardAssigner`] using `xxh64(key, 0) % shard_num`
#[derive(Debug, Clone, Copy, Default)]
pub struct XxHashAssigner;

impl ShardAssigner for XxHashAssigner {
    fn shard_id(&self, key: &[u8], shard_num: u32) -> u32 {
        if shard_num == 0 {
            return 0;
        }
        (xxh64(key, 0) % u64::from(shard_num)) as u32
    }
}
