//! Time-range index scan
//!
//! ## Key Layout
//!
//! ```text
//! | state (1) | start time (8, big-endian) | chunk id (8, big-endian) |
//! ```
//!
//! The index is ordered state-major then time-major, so a scan seeded at
//! `[state][start]` walks entries of that state in time order and the first
//! key of another state ends it.
//!
//! ## Limit
//!
//! Every shard x state pair is one scan line. Lines share one counter:
//! each accepted chunk increments it and a line stops once the counter
//! exceeds the limit. The check happens after acceptance, so every line
//! still running when the threshold is crossed may admit one more chunk.
//! Results can therefore exceed the limit by at most the number of lines.

use crate::config::ScanMode;
use crate::schema::START_TIME_INDEX;
use crate::series::TraceSeries;
use byteorder::{BigEndian, ByteOrder};
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use tracestore_core::{
    ChunkId, Error, ErrorList, Partial, ReadScope, ScanOptions, ScanOpts, State, Visit,
};
use tracing::{debug, warn};

/// Length of the `[state][start time]` key prefix
pub const KEY_PREFIX_LEN: usize = 1 + 8;

/// Seek key of one scan line
pub fn seek_key(state: State, start_time: u64) -> [u8; KEY_PREFIX_LEN] {
    let mut key = [0u8; KEY_PREFIX_LEN];
    key[0] = state.as_byte();
    BigEndian::write_u64(&mut key[1..], start_time);
    key
}

/// Full index key of one chunk
pub fn index_key(state: State, start_time: u64, chunk_id: ChunkId) -> Vec<u8> {
    let mut key = Vec::with_capacity(KEY_PREFIX_LEN + ChunkId::SIZE);
    key.extend_from_slice(&seek_key(state, start_time));
    key.extend_from_slice(&chunk_id.to_bytes());
    key
}

#[derive(Debug, Clone, Copy)]
struct ScanLine {
    shard: u32,
    state: State,
}

/// Outcome of one scan line
#[derive(Debug, Default)]
struct LineResult {
    chunk_ids: Vec<ChunkId>,
    errors: ErrorList,
}

struct Window<'a> {
    start: u64,
    end: u64,
    limit: u32,
    counter: &'a AtomicU32,
    opts: ScanOpts,
}

impl TraceSeries {
    /// Chunk ids whose index entries fall in `[start_time, end_time]`
    ///
    /// Never fails as a whole: each failed scan line is recorded and the
    /// remaining lines still run.
    pub fn scan_chunk_ids(
        &self,
        start_time: u64,
        end_time: u64,
        opts: &ScanOptions,
    ) -> Partial<Vec<ChunkId>> {
        let limit = opts.effective_limit(self.config.default_limit);
        let lines: Vec<ScanLine> = (0..self.schema.shard_num())
            .flat_map(|shard| {
                opts.state
                    .states()
                    .iter()
                    .map(move |&state| ScanLine { shard, state })
            })
            .collect();

        let counter = AtomicU32::new(0);
        let window = Window {
            start: start_time,
            end: end_time,
            limit,
            counter: &counter,
            opts: ScanOpts {
                prefetch_values: false,
                prefetch_size: limit as usize,
                reverse: false,
            },
        };

        let results: Vec<LineResult> = match self.config.scan_mode {
            ScanMode::Sequential => lines
                .iter()
                .map(|line| self.scan_line(*line, &window))
                .collect(),
            ScanMode::Parallel => self.scan_lines_parallel(&lines, &window),
        };

        let mut chunk_ids = Vec::with_capacity(limit as usize);
        let mut errors = ErrorList::new();
        for result in results {
            chunk_ids.extend(result.chunk_ids);
            errors.append(result.errors);
        }
        Partial::new(chunk_ids, errors)
    }

    fn scan_lines_parallel(&self, lines: &[ScanLine], window: &Window<'_>) -> Vec<LineResult> {
        thread::scope(|s| {
            let handles: Vec<_> = lines
                .iter()
                .map(|line| s.spawn(move || self.scan_line(*line, window)))
                .collect();
            handles
                .into_iter()
                .zip(lines)
                .map(|(handle, line)| {
                    handle.join().unwrap_or_else(|_| {
                        let mut result = LineResult::default();
                        result.errors.push(Error::Storage(format!(
                            "scan line shard {} state {:?} panicked",
                            line.shard, line.state
                        )));
                        result
                    })
                })
                .collect()
        })
    }

    fn scan_line(&self, line: ScanLine, window: &Window<'_>) -> LineResult {
        let mut result = LineResult::default();
        let state_byte = line.state.as_byte();
        let seek = seek_key(line.state, window.start);
        let scope = ReadScope::new(line.shard, START_TIME_INDEX, window.start, window.end);

        let scanned = self.reader.scan(
            &scope,
            &seek,
            &window.opts,
            &mut |key, _| {
                if key.len() <= KEY_PREFIX_LEN {
                    result.errors.push(Error::invalid_key(key));
                    return Ok(Visit::Skip);
                }
                if key[0] != state_byte {
                    return Ok(Visit::Stop);
                }
                let ts = BigEndian::read_u64(&key[1..KEY_PREFIX_LEN]);
                if ts > window.end {
                    return Ok(Visit::Skip);
                }
                let suffix = &key[KEY_PREFIX_LEN..];
                if suffix.len() < ChunkId::SIZE {
                    result.errors.push(Error::invalid_key(key));
                    return Ok(Visit::Skip);
                }
                result
                    .chunk_ids
                    .push(ChunkId(BigEndian::read_u64(&suffix[..ChunkId::SIZE])));
                let num = window.counter.fetch_add(1, Ordering::AcqRel) + 1;
                if num > window.limit {
                    return Ok(Visit::Stop);
                }
                Ok(Visit::Continue)
            },
        );

        if let Err(e) = scanned {
            warn!(shard_id = line.shard, state = ?line.state, error = %e, "scan line failed");
            result.errors.push(e);
        }
        debug!(
            shard_id = line.shard,
            state = ?line.state,
            chunk_num = result.chunk_ids.len(),
            "scan line finished"
        );
        result
    }
}
