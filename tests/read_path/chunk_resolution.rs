//! Chunk Resolution Tests
//!
//! Direct chunk id batches: ordering, per-item failure and encoding.

use crate::common::*;
use tracestore::MsgPackCodec;

/// A chunk id whose shard bits point past the configured shard count
fn undecodable_chunk() -> ChunkId {
    ChunkId((1 << 20) | (5 << 10))
}

#[test]
fn second_of_three_fails_to_decode() {
    let ts = TestStore::new();
    let first = ts.write(&Span::new("t1", "first", State::Success, T0));
    let third = ts.write(&Span::new("t3", "third", State::Error, T0 + MILLI));
    let bad = undecodable_chunk();

    let result = ts
        .store
        .fetch_entity(&[first, bad, third], &project(&["a"]))
        .unwrap();
    assert_eq!(entity_ids(&result.value), vec!["first", "third"]);
    assert_eq!(result.errors.len(), 1);

    let err = result.errors.iter().next().unwrap();
    match err {
        CoreError::Chunk { chunk_id, source } => {
            assert_eq!(*chunk_id, bad.as_u64());
            assert!(matches!(**source, CoreError::InvalidChunkId { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn input_order_preserved() {
    let ts = TestStore::new();
    let chunks = ts.write_all(&[
        Span::new("t1", "a", State::Success, T0),
        Span::new("t2", "b", State::Success, T0 + MILLI),
        Span::new("t3", "c", State::Error, T0 + 2 * MILLI),
    ]);
    let reversed: Vec<_> = chunks.iter().rev().copied().collect();

    let result = ts.store.fetch_entity(&reversed, &project(&["a"])).unwrap();
    assert_eq!(entity_ids(&result.value), vec!["c", "b", "a"]);
}

#[test]
fn duplicates_resolved_each_time() {
    let ts = TestStore::new();
    let chunk = ts.write(&Span::new("t1", "e1", State::Success, T0));

    let result = ts
        .store
        .fetch_entity(&[chunk, chunk], &project(&["a"]))
        .unwrap();
    assert_eq!(entity_ids(&result.value), vec!["e1", "e1"]);
}

#[test]
fn resolution_is_idempotent() {
    let ts = TestStore::new();
    let chunk = ts.write(&Span::new("t1", "e1", State::Error, T0));
    let opts = project(&["service", "a", "data_binary"]);

    let once = ts.store.fetch_entity(&[chunk], &opts).unwrap();
    let twice = ts.store.fetch_entity(&[chunk], &opts).unwrap();

    let a = ts.store.encode_entity(&once.value[0]).unwrap();
    let b = ts.store.encode_entity(&twice.value[0]).unwrap();
    assert_eq!(a, b);
}

#[test]
fn encoded_entity_decodes_back() {
    let ts = TestStore::new();
    let chunk = ts.write(&Span::new("t1", "e1", State::Success, T0));

    let result = ts.store.fetch_entity(&[chunk], &project(&["b"])).unwrap();
    let entity = &result.value[0];
    let raw = ts.store.encode_entity(entity).unwrap();
    let decoded = MsgPackCodec.decode_entity(&raw).unwrap();
    assert_eq!(&decoded, entity);
    assert!(decoded.data_binary.is_none());
}

#[test]
fn empty_batch_rejected() {
    let ts = TestStore::new();
    let err = ts.store.fetch_entity(&[], &project(&["a"])).unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(ts.reads(), 0);
}

#[test]
fn empty_projection_rejected_without_io() {
    let ts = TestStore::new();
    let chunk = ts.write(&Span::new("t1", "e1", State::Success, T0));

    let err = ts
        .store
        .fetch_entity(&[chunk], &ScanOptions::new())
        .unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(ts.reads(), 0);
}

#[test]
fn zero_chunk_id_recorded() {
    let ts = TestStore::new();
    let result = ts
        .store
        .fetch_entity(&[ChunkId(0)], &project(&["a"]))
        .unwrap();
    assert!(result.value.is_empty());
    assert!(matches!(
        result.errors.iter().next().unwrap().root(),
        CoreError::InvalidChunkId { chunk_id: 0, .. }
    ));
}

#[test]
fn entity_timestamp_comes_from_record() {
    let ts = TestStore::new();
    let span = Span::new("t1", "e1", State::Success, T0 + 123_456);
    let chunk = ts.write(&span);

    let result = ts.store.fetch_entity(&[chunk], &project(&["a"])).unwrap();
    assert_eq!(result.value[0].timestamp_nanos, T0 + 123_456);
}
