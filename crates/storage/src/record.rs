//! MessagePack record codec
//!
//! Records and entities are encoded with `rmp-serde` using named fields, so
//! entity sections left as `None` are omitted from the bytes entirely.

use tracestore_core::{Entity, EntityRecord, Error, RecordCodec, Result};

/// [`RecordCodec`] backed by MessagePack
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(value).map_err(|e| Error::Codec(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(raw: &[u8]) -> Result<T> {
    rmp_serde::from_slice(raw).map_err(|e| Error::Codec(e.to_string()))
}

impl RecordCodec for MsgPackCodec {
    fn decode_record(&self, raw: &[u8]) -> Result<EntityRecord> {
        decode(raw)
    }

    fn encode_record(&self, record: &EntityRecord) -> Result<Vec<u8>> {
        encode(record)
    }

    fn encode_entity(&self, entity: &Entity) -> Result<Vec<u8>> {
        encode(entity)
    }

    fn decode_entity(&self, raw: &[u8]) -> Result<Entity> {
        decode(raw)
    }
}
