//! Field values and stored entity records
//!
//! An [`EntityRecord`] is what the fields store holds for one series: the
//! entity id, its timestamp, and every field value laid out by ordinal.
//! Ordinals come from the schema's field list.

use crate::types::{Field, FieldEntry};
use serde::{Deserialize, Serialize};

/// A single field value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldValue {
    /// Absent value
    #[default]
    Null,
    /// UTF-8 string
    Str(String),
    /// List of strings
    StrArray(Vec<String>),
    /// Signed integer
    Int(i64),
    /// List of signed integers
    IntArray(Vec<i64>),
    /// Raw bytes
    Binary(Vec<u8>),
}

impl FieldValue {
    /// Check if this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Integer payload, if any
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        FieldValue::Binary(b)
    }
}

static NULL: FieldValue = FieldValue::Null;

/// Decoded content of a fields-store record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Entity identifier
    pub entity_id: Vec<u8>,
    /// Entity timestamp in nanoseconds
    pub timestamp_nanos: u64,
    /// Field values, position = ordinal
    pub fields: Vec<FieldValue>,
}

impl EntityRecord {
    /// Create a record
    pub fn new(entity_id: impl Into<Vec<u8>>, timestamp_nanos: u64, fields: Vec<FieldValue>) -> Self {
        Self {
            entity_id: entity_id.into(),
            timestamp_nanos,
            fields,
        }
    }

    /// Value at `ordinal`, `Null` when the record predates that field
    pub fn field(&self, ordinal: usize) -> &FieldValue {
        self.fields.get(ordinal).unwrap_or(&NULL)
    }

    /// Pick the requested ordinals, in request order
    pub fn project(&self, entries: &[FieldEntry]) -> Vec<Field> {
        entries
            .iter()
            .map(|entry| Field {
                name: entry.name.clone(),
                value: self.field(entry.index).clone(),
            })
            .collect()
    }
}
