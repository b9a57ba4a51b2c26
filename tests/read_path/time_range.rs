//! Fetch By Time Range Tests
//!
//! Window bounds, state filtering, the shared limit and scan line failures.

use crate::common::*;
use std::sync::Arc;

fn single_shard() -> TestStore {
    TestStore::with_builder(TraceStore::builder().shard_num(1))
}

fn states_of(entities: &[Entity]) -> Vec<i64> {
    // field `a` carries the state in these fixtures
    entities
        .iter()
        .map(|e| e.field("a").and_then(FieldValue::as_int).unwrap_or(-1))
        .collect()
}

fn span(trace: &str, id: &str, state: State, ts: u64) -> Span {
    let marker = i64::from(state.as_byte());
    Span::new(trace, id, state, ts).with_fields(vec![FieldValue::Int(marker)])
}

// ============================================================================
// Window
// ============================================================================

#[test]
fn window_is_inclusive_and_bounded() {
    let ts = single_shard();
    ts.write_all(&[
        span("t1", "before", State::Success, T0 - MILLI),
        span("t1", "start", State::Success, T0),
        span("t1", "middle", State::Success, T0 + 2 * MILLI),
        span("t1", "end", State::Success, T0 + 4 * MILLI),
        span("t1", "after", State::Success, T0 + 5 * MILLI),
    ]);

    let result = ts
        .store
        .fetch_by_time_range(T0, T0 + 4 * MILLI, &project(&["a"]))
        .unwrap();
    assert!(result.is_complete());
    assert_eq!(entity_ids(&result.value), vec!["start", "middle", "end"]);
}

#[test]
fn empty_window_returns_nothing() {
    let ts = TestStore::new();
    ts.write(&span("t1", "e1", State::Success, T0));

    let result = ts
        .store
        .fetch_by_time_range(T0 + MILLI, T0 + 2 * MILLI, &project(&["a"]))
        .unwrap();
    assert!(result.value.is_empty());
    assert!(result.is_complete());
}

#[test]
fn results_follow_time_order_within_a_line() {
    let ts = single_shard();
    ts.write_all(&[
        span("t1", "third", State::Error, T0 + 3 * MILLI),
        span("t2", "first", State::Error, T0 + MILLI),
        span("t3", "second", State::Error, T0 + 2 * MILLI),
    ]);

    let opts = project(&["a"]).with_state(TraceState::Error);
    let result = ts.store.fetch_by_time_range(T0, T0 + 10 * MILLI, &opts).unwrap();
    assert_eq!(entity_ids(&result.value), vec!["first", "second", "third"]);
}

// ============================================================================
// State filter
// ============================================================================

#[test]
fn specific_state_excludes_other() {
    let ts = TestStore::new();
    for i in 0..4u64 {
        ts.write(&span(&format!("ok{}", i), &format!("ok{}", i), State::Success, T0 + i * MILLI));
        ts.write(&span(&format!("bad{}", i), &format!("bad{}", i), State::Error, T0 + i * MILLI));
    }

    let success = ts
        .store
        .fetch_by_time_range(T0, T0 + 10 * MILLI, &project(&["a"]).with_state(TraceState::Success))
        .unwrap();
    assert_eq!(success.value.len(), 4);
    assert!(states_of(&success.value).iter().all(|s| *s == 0));

    let errors = ts
        .store
        .fetch_by_time_range(T0, T0 + 10 * MILLI, &project(&["a"]).with_state(TraceState::Error))
        .unwrap();
    assert_eq!(errors.value.len(), 4);
    assert!(states_of(&errors.value).iter().all(|s| *s == 1));
}

#[test]
fn default_state_scans_both() {
    let ts = TestStore::new();
    ts.write(&span("t1", "ok", State::Success, T0));
    ts.write(&span("t2", "bad", State::Error, T0 + MILLI));

    let result = ts
        .store
        .fetch_by_time_range(T0, T0 + 10 * MILLI, &project(&["a"]))
        .unwrap();
    let mut ids = entity_ids(&result.value);
    ids.sort();
    assert_eq!(ids, vec!["bad", "ok"]);
}

// ============================================================================
// Limit
// ============================================================================

#[test]
fn two_shards_both_states_limit_five() {
    let ts = TestStore::new();
    let mut spans = Vec::new();
    for i in 0..3u64 {
        spans.push(span(&format!("s{}", i), &format!("s{}", i), State::Success, T0 + i * MILLI));
    }
    for i in 0..4u64 {
        spans.push(span(&format!("e{}", i), &format!("e{}", i), State::Error, T0 + i * MILLI));
    }
    spans.push(span("late", "late", State::Error, T0 + 20 * MILLI));
    ts.write_all(&spans);

    let end = T0 + 10 * MILLI;
    let result = ts
        .store
        .fetch_by_time_range(T0, end, &project(&["a"]).with_limit(5))
        .unwrap();
    let lines = 2 * 2;
    assert!(result.value.len() <= 5 + lines);
    let states = states_of(&result.value);
    assert!(states.contains(&0));
    assert!(states.contains(&1));
    assert!(result.value.iter().all(|e| e.timestamp_nanos <= end));
}

#[test]
fn limit_overshoot_is_one_per_line() {
    let ts = single_shard();
    for i in 0..10u64 {
        ts.write(&span("t", &format!("ok{}", i), State::Success, T0 + i * MILLI));
        ts.write(&span("t", &format!("bad{}", i), State::Error, T0 + i * MILLI));
    }

    let result = ts
        .store
        .fetch_by_time_range(T0, T0 + 100 * MILLI, &project(&["a"]).with_limit(2))
        .unwrap();
    // success line admits 3 (counter passes 2 on the third), error line admits 1
    assert_eq!(entity_ids(&result.value), vec!["ok0", "ok1", "ok2", "bad0"]);
}

#[test]
fn zero_limit_uses_default_of_ten() {
    let ts = single_shard();
    for i in 0..20u64 {
        ts.write(&span("t", &format!("e{:02}", i), State::Success, T0 + i * MILLI));
    }
    let opts = project(&["a"]).with_state(TraceState::Success);

    let unset = ts
        .store
        .fetch_by_time_range(T0, T0 + 100 * MILLI, &opts.clone().with_limit(0))
        .unwrap();
    let ten = ts
        .store
        .fetch_by_time_range(T0, T0 + 100 * MILLI, &opts.with_limit(10))
        .unwrap();
    assert_eq!(unset.value.len(), 11);
    assert_eq!(entity_ids(&unset.value), entity_ids(&ten.value));
}

#[test]
fn configured_default_limit_applies() {
    let ts = TestStore::with_builder(TraceStore::builder().shard_num(1).default_limit(3));
    for i in 0..10u64 {
        ts.write(&span("t", &format!("e{}", i), State::Success, T0 + i * MILLI));
    }
    let opts = project(&["a"]).with_state(TraceState::Success);
    let result = ts.store.fetch_by_time_range(T0, T0 + 100 * MILLI, &opts).unwrap();
    assert_eq!(result.value.len(), 4);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn failed_scan_line_does_not_stop_others() {
    let memory = Arc::new(MemoryStore::new());
    let faulty = FaultyReader::new(memory.clone()).fail_scan_on(0);
    let ts = TestStore::with_reader(TraceStore::builder(), memory, Arc::new(faulty));

    let mut on_shard_1 = Vec::new();
    for i in 0..20u64 {
        let trace = format!("trace-{}", i);
        let chunk = ts.write(&span(&trace, &trace, State::Success, T0 + i * MILLI));
        if ts.trace_shard(trace.as_bytes()) == 1 {
            on_shard_1.push(chunk);
        }
    }
    assert!(!on_shard_1.is_empty());

    let result = ts
        .store
        .fetch_by_time_range(T0, T0 + 100 * MILLI, &project(&["a"]).with_limit(100))
        .unwrap();
    // one failure per state on shard 0
    assert_eq!(result.errors.len(), 2);
    assert!(result
        .errors
        .iter()
        .all(|e| matches!(e, CoreError::Storage(msg) if msg.contains("shard 0"))));
    assert_eq!(result.value.len(), on_shard_1.len());
}

#[test]
fn malformed_index_keys_recorded_and_skipped() {
    let ts = single_shard();
    ts.write(&span("t1", "good", State::Success, T0 + 2 * MILLI));

    let mut prefix_only = vec![State::Success.as_byte()];
    prefix_only.extend_from_slice(&(T0 + MILLI).to_be_bytes());
    ts.put_start_index(0, prefix_only.clone(), T0 + MILLI);

    let mut short_suffix = prefix_only;
    short_suffix.extend_from_slice(&[9, 9, 9]);
    ts.put_start_index(0, short_suffix, T0 + MILLI);

    let opts = project(&["a"]).with_state(TraceState::Success);
    let result = ts.store.fetch_by_time_range(T0, T0 + 10 * MILLI, &opts).unwrap();
    assert_eq!(entity_ids(&result.value), vec!["good"]);
    assert_eq!(result.errors.len(), 2);
    assert!(result
        .errors
        .iter()
        .all(|e| matches!(e, CoreError::InvalidKey { .. })));
}

#[test]
fn unresolvable_scanned_chunk_recorded() {
    let ts = single_shard();
    ts.write(&span("t1", "good", State::Success, T0));
    let orphan = ts.codec().generate(0, T0 + MILLI).unwrap();
    ts.put_start_index(0, index_key(State::Success, T0 + MILLI, orphan), T0 + MILLI);

    let result = ts
        .store
        .fetch_by_time_range(T0, T0 + 10 * MILLI, &project(&["a"]))
        .unwrap();
    assert_eq!(entity_ids(&result.value), vec!["good"]);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors.iter().next().unwrap().is_not_found());
}

// ============================================================================
// Preconditions
// ============================================================================

#[test]
fn unknown_field_rejected_without_io() {
    let ts = TestStore::new();
    ts.write(&span("t1", "e1", State::Success, T0));

    let err = ts
        .store
        .fetch_by_time_range(T0, T0 + MILLI, &project(&["nope"]))
        .unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(ts.reads(), 0);
}

#[test]
fn empty_projection_rejected_without_io() {
    let ts = TestStore::new();
    ts.write(&span("t1", "e1", State::Success, T0));

    let err = ts
        .store
        .fetch_by_time_range(T0, T0 + MILLI, &ScanOptions::new())
        .unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(ts.reads(), 0);
}

#[test]
fn empty_projection_rejected_before_failing_scan_lines() {
    let memory = Arc::new(MemoryStore::new());
    let faulty = FaultyReader::new(memory.clone()).fail_scan_on(0);
    let ts = TestStore::with_reader(TraceStore::builder(), memory, Arc::new(faulty));
    for i in 0..20u64 {
        let trace = format!("trace-{}", i);
        ts.write(&span(&trace, &trace, State::Success, T0 + i * MILLI));
    }

    let err = ts
        .store
        .fetch_by_time_range(T0, T0 + 100 * MILLI, &ScanOptions::new())
        .unwrap_err();
    assert!(matches!(err, Error::Read(CoreError::ProjectionEmpty)));
    assert_eq!(ts.reads(), 0);
}

// ============================================================================
// Parallel scan
// ============================================================================

#[test]
fn parallel_matches_sequential_below_limit() {
    let build = |mode| {
        let ts = TestStore::with_builder(TraceStore::builder().shard_num(4).scan_mode(mode));
        for i in 0..12u64 {
            let state = if i % 3 == 0 { State::Error } else { State::Success };
            let trace = format!("trace-{}", i);
            ts.write(&span(&trace, &trace, state, T0 + i * MILLI));
        }
        ts
    };
    let opts = project(&["a"]).with_limit(100);

    let sequential = build(ScanMode::Sequential);
    let parallel = build(ScanMode::Parallel);
    let seq = sequential
        .store
        .fetch_by_time_range(T0, T0 + 100 * MILLI, &opts)
        .unwrap();
    let par = parallel
        .store
        .fetch_by_time_range(T0, T0 + 100 * MILLI, &opts)
        .unwrap();

    assert!(par.is_complete());
    assert_eq!(entity_ids(&seq.value), entity_ids(&par.value));
}

#[test]
fn parallel_respects_limit_bound() {
    let ts = TestStore::with_builder(
        TraceStore::builder()
            .shard_num(4)
            .scan_mode(ScanMode::Parallel),
    );
    for i in 0..64u64 {
        let state = if i % 2 == 0 { State::Error } else { State::Success };
        let trace = format!("trace-{}", i);
        ts.write(&span(&trace, &trace, state, T0 + i * MILLI));
    }

    let result = ts
        .store
        .fetch_by_time_range(T0, T0 + 100 * MILLI, &project(&["a"]).with_limit(5))
        .unwrap();
    let lines = 4 * 2;
    assert!(result.value.len() > 5);
    assert!(result.value.len() <= 5 + lines);
}
