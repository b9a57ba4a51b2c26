//! Error types for the trace read path
//!
//! Two kinds of failure flow through a query:
//! - Precondition failures (`InvalidTraceId`, `ChunkIdsEmpty`, `ProjectionEmpty`,
//!   `FieldNotFound`) abort the whole call before any I/O
//! - Per-item failures (chunk decode, mapping lookup, materialization, one scan
//!   line) are collected into an [`ErrorList`] and returned next to whatever
//!   succeeded, wrapped in a [`Partial`]

use std::fmt;
use thiserror::Error;

/// Errors produced by the read path and its collaborators
#[derive(Debug, Error)]
pub enum Error {
    /// Trace id was empty
    #[error("invalid trace id: trace id must not be empty")]
    InvalidTraceId,

    /// Malformed index key or index value
    #[error("invalid key: {key}")]
    InvalidKey {
        /// Hex encoding of the offending bytes
        key: String,
    },

    /// Entity resolution was asked to resolve nothing
    #[error("chunk ids are empty")]
    ChunkIdsEmpty,

    /// Projection resolved to neither fields nor the data binary
    #[error("projection is empty")]
    ProjectionEmpty,

    /// Projected field name is not part of the schema
    #[error("field not found: field name:{name}")]
    FieldNotFound {
        /// The unknown field name
        name: String,
    },

    /// State byte is neither success nor error
    #[error("unsupported state: {0}")]
    UnsupportedState(u8),

    /// Chunk id could not be decomposed into shard and timestamp
    #[error("invalid chunk id {chunk_id}: {reason}")]
    InvalidChunkId {
        /// Raw chunk id
        chunk_id: u64,
        /// What was wrong with it
        reason: String,
    },

    /// Mapping table value too short to hold state, series id and suffix
    #[error("invalid internal ref: {len} bytes")]
    InvalidInternalRef {
        /// Length of the raw value
        len: usize,
    },

    /// Key absent from a store
    #[error("not found: {store}/{key}")]
    NotFound {
        /// Store name
        store: String,
        /// Hex encoding of the key
        key: String,
    },

    /// Failure reported by the storage layer
    #[error("storage error: {0}")]
    Storage(String),

    /// Record encoding or decoding failure
    #[error("codec error: {0}")]
    Codec(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failure attributed to one chunk of a batch
    #[error("chunk {chunk_id}: {source}")]
    Chunk {
        /// Chunk id being resolved
        chunk_id: u64,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Several independent failures
    #[error("{0}")]
    Aggregate(ErrorList),
}

/// Result type for read path operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build an `InvalidKey` from raw key bytes
    pub fn invalid_key(key: &[u8]) -> Self {
        Error::InvalidKey {
            key: hex::encode(key),
        }
    }

    /// Build a `NotFound` from a store name and raw key bytes
    pub fn not_found(store: &str, key: &[u8]) -> Self {
        Error::NotFound {
            store: store.to_string(),
            key: hex::encode(key),
        }
    }

    /// Attribute this error to a chunk
    pub fn for_chunk(self, chunk_id: u64) -> Self {
        Error::Chunk {
            chunk_id,
            source: Box::new(self),
        }
    }

    /// Strip chunk attribution and return the underlying error
    pub fn root(&self) -> &Error {
        match self {
            Error::Chunk { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this error was raised before any I/O was issued
    pub fn is_precondition(&self) -> bool {
        matches!(
            self.root(),
            Error::InvalidTraceId
                | Error::ChunkIdsEmpty
                | Error::ProjectionEmpty
                | Error::FieldNotFound { .. }
        )
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Error::NotFound { .. })
    }
}

/// Ordered collection of independent failures
///
/// Each cause keeps its own identity; nothing is chained or flattened.
#[derive(Debug, Default)]
pub struct ErrorList {
    errors: Vec<Error>,
}

impl ErrorList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure
    pub fn push(&mut self, err: Error) {
        self.errors.push(err);
    }

    /// Append every failure of another list, flattening nested aggregates
    pub fn append(&mut self, other: ErrorList) {
        for err in other.errors {
            match err {
                Error::Aggregate(nested) => self.append(nested),
                err => self.errors.push(err),
            }
        }
    }

    /// Number of recorded failures
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if nothing failed
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over the recorded failures in encounter order
    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.errors.iter()
    }

    /// Collapse into a single error, `None` when empty
    pub fn into_error(self) -> Option<Error> {
        if self.errors.is_empty() {
            None
        } else {
            Some(Error::Aggregate(self))
        }
    }

    /// `Ok(())` when empty, otherwise the aggregate
    pub fn into_result(self) -> Result<()> {
        match self.into_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            0 => write!(f, "no errors"),
            1 => write!(f, "{}", self.errors[0]),
            n => {
                write!(f, "{} errors occurred:", n)?;
                for err in &self.errors {
                    write!(f, "\n\t* {}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl From<Error> for ErrorList {
    fn from(err: Error) -> Self {
        let mut list = ErrorList::new();
        list.append(ErrorList { errors: vec![err] });
        list
    }
}

impl IntoIterator for ErrorList {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl FromIterator<Error> for ErrorList {
    fn from_iter<I: IntoIterator<Item = Error>>(iter: I) -> Self {
        let mut list = ErrorList::new();
        for err in iter {
            list.append(ErrorList::from(err));
        }
        list
    }
}

/// Result of a batch operation that keeps going past failures
///
/// `errors` being non-empty next to a non-empty `value` means the call
/// succeeded with some losses.
#[derive(Debug)]
pub struct Partial<T> {
    /// Whatever succeeded
    pub value: T,
    /// Every failure encountered along the way
    pub errors: ErrorList,
}

impl<T> Partial<T> {
    /// Wrap a value and its failures
    pub fn new(value: T, errors: ErrorList) -> Self {
        Self { value, errors }
    }

    /// Wrap a value with no failures
    pub fn complete(value: T) -> Self {
        Self::new(value, ErrorList::new())
    }

    /// Check if nothing failed
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Transform the value, keeping the failures
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Partial<U> {
        Partial::new(f(self.value), self.errors)
    }

    /// Discard partial success: any failure becomes the error
    pub fn into_result(self) -> Result<T> {
        self.errors.into_result()?;
        Ok(self.value)
    }

    /// Split into value and optional aggregate error
    pub fn into_parts(self) -> (T, Option<Error>) {
        (self.value, self.errors.into_error())
    }
}
