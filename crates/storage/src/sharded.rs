//! Sharded in-memory sorted key-value store
//!
//! Reference [`KvReader`] implementation used by tests, benchmarks and
//! embedded deployments.
//!
//! # Design
//!
//! - DashMap: one entry per shard, lock-free reads
//! - FxHashMap: store name -> table, O(1) lookups
//! - BTreeMap: keys ordered by raw bytes, so range scans follow key order
//! - Versions: every key keeps its values with their write timestamps
//!
//! # Time Scopes
//!
//! Time is split into fixed-duration blocks. A read scoped to
//! `[time_from, time_to]` sees a version when the version's block lies
//! between the blocks of `time_from` and `time_to`. Entries slightly outside
//! the window but inside a boundary block stay visible; callers filter on
//! the exact timestamp where it matters. The scope `(0, 0)` sees everything.

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracestore_core::{Error, KvReader, ReadScope, Result, ScanOpts, Visit, Visitor};
use tracing::trace;

/// One stored value and the time it was written at
#[derive(Debug, Clone, PartialEq, Eq)]
struct Version {
    ts: u64,
    value: Vec<u8>,
}

type Table = BTreeMap<Vec<u8>, Vec<Version>>;

/// All stores of one shard
#[derive(Debug, Default)]
pub struct Shard {
    tables: FxHashMap<String, Table>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys across all stores of this shard
    pub fn len(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }

    /// Check if shard is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Options for [`MemoryStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStoreOptions {
    /// Width of a time block
    pub block_duration: Duration,
}

impl Default for MemoryStoreOptions {
    fn default() -> Self {
        Self {
            block_duration: Duration::from_secs(3600),
        }
    }
}

/// Sharded sorted store - DashMap by shard, ordered tables within
///
/// # Thread Safety
///
/// All operations are thread-safe:
/// - reads take a shared guard on one shard only
/// - `put` locks only the target shard
///
/// # Example
///
/// ```ignore
/// use tracestore_storage::MemoryStore;
///
/// let store = MemoryStore::new();
/// store.put(0, "trace_index", b"t1", 42u64.to_be_bytes().to_vec(), 0);
/// ```
pub struct MemoryStore {
    shards: DashMap<u32, Shard>,
    block_nanos: u64,
    reads: AtomicU64,
}

impl MemoryStore {
    /// Create a store with one-hour time blocks
    pub fn new() -> Self {
        Self::with_options(MemoryStoreOptions::default())
    }

    /// Create a store with explicit options
    pub fn with_options(options: MemoryStoreOptions) -> Self {
        let block_nanos = u64::try_from(options.block_duration.as_nanos())
            .unwrap_or(u64::MAX)
            .max(1);
        Self {
            shards: DashMap::new(),
            block_nanos,
            reads: AtomicU64::new(0),
        }
    }

    /// Append a version of `key` written at `ts`
    ///
    /// Existing versions are kept; `get_all` returns them in insertion order.
    pub fn put(&self, shard: u32, store: &str, key: &[u8], value: Vec<u8>, ts: u64) {
        self.shards
            .entry(shard)
            .or_insert_with(Shard::new)
            .tables
            .entry(store.to_string())
            .or_default()
            .entry(key.to_vec())
            .or_default()
            .push(Version { ts, value });
    }

    /// Number of shards holding data
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Total number of keys across all shards and stores
    pub fn total_entries(&self) -> usize {
        self.shards.iter().map(|entry| entry.value().len()).sum()
    }

    /// Number of read operations served so far
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Acquire)
    }

    fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    fn block_of(&self, ts: u64) -> u64 {
        ts - ts % self.block_nanos
    }

    fn visible(&self, scope: &ReadScope<'_>, ts: u64) -> bool {
        if scope.is_unbounded() {
            return true;
        }
        let block = self.block_of(ts);
        block >= self.block_of(scope.time_from) && block <= self.block_of(scope.time_to)
    }

    fn newest_visible<'v>(&self, scope: &ReadScope<'_>, versions: &'v [Version]) -> Option<&'v Version> {
        versions.iter().rev().find(|v| self.visible(scope, v.ts))
    }

    /// Run `f` against the table addressed by `scope`, if it exists
    fn with_table<T>(&self, scope: &ReadScope<'_>, f: impl FnOnce(&Table) -> T) -> Option<T> {
        self.shards
            .get(&scope.shard)
            .and_then(|shard| shard.tables.get(scope.store).map(f))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("shard_count", &self.shard_count())
            .field("total_entries", &self.total_entries())
            .field("block_nanos", &self.block_nanos)
            .finish()
    }
}

impl KvReader for MemoryStore {
    fn get(&self, scope: &ReadScope<'_>, key: &[u8]) -> Result<Vec<u8>> {
        self.record_read();
        self.with_table(scope, |table| {
            table
                .get(key)
                .and_then(|versions| self.newest_visible(scope, versions))
                .map(|v| v.value.clone())
        })
        .flatten()
        .ok_or_else(|| Error::not_found(scope.store, key))
    }

    fn get_all(&self, scope: &ReadScope<'_>, key: &[u8]) -> Result<Vec<Vec<u8>>> {
        self.record_read();
        Ok(self
            .with_table(scope, |table| {
                table
                    .get(key)
                    .map(|versions| {
                        versions
                            .iter()
                            .filter(|v| self.visible(scope, v.ts))
                            .map(|v| v.value.clone())
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            })
            .unwrap_or_default())
    }

    fn get_at(&self, scope: &ReadScope<'_>, key: &[u8], ts: u64) -> Result<Vec<u8>> {
        self.record_read();
        self.with_table(scope, |table| {
            table.get(key).and_then(|versions| {
                versions
                    .iter()
                    .rev()
                    .find(|v| v.ts == ts && self.visible(scope, v.ts))
                    .map(|v| v.value.clone())
            })
        })
        .flatten()
        .ok_or_else(|| Error::not_found(scope.store, key))
    }

    fn scan(
        &self,
        scope: &ReadScope<'_>,
        seek: &[u8],
        opts: &ScanOpts,
        visit: &mut Visitor<'_>,
    ) -> Result<()> {
        self.record_read();
        let shard = match self.shards.get(&scope.shard) {
            Some(shard) => shard,
            None => return Ok(()),
        };
        let table = match shard.tables.get(scope.store) {
            Some(table) => table,
            None => return Ok(()),
        };

        let entries: Box<dyn Iterator<Item = (&Vec<u8>, &Vec<Version>)> + '_> = if opts.reverse {
            Box::new(
                table
                    .range::<[u8], _>((Bound::Unbounded, Bound::Included(seek)))
                    .rev(),
            )
        } else {
            Box::new(table.range::<[u8], _>((Bound::Included(seek), Bound::Unbounded)))
        };

        let mut visited = 0usize;
        let mut skipped = 0usize;
        for (key, versions) in entries {
            let version = match self.newest_visible(scope, versions) {
                Some(v) => v,
                None => continue,
            };
            visited += 1;
            let load = || -> Result<Vec<u8>> { Ok(version.value.clone()) };
            match visit(key.as_slice(), &load)? {
                Visit::Continue => {}
                Visit::Skip => skipped += 1,
                Visit::Stop => break,
            }
        }
        trace!(
            shard = scope.shard,
            store = scope.store,
            seek = %hex::encode(seek),
            visited,
            skipped,
            "scan finished"
        );
        Ok(())
    }
}
