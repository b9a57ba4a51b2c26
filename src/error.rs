//! Unified error type for tracestore.
//!
//! Wraps read path failures and the setup failures of opening a store
//! behind one interface.

use thiserror::Error;
use tracestore_core::ErrorList;

/// All tracestore errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Read path failure
    #[error(transparent)]
    Read(tracestore_core::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tracestore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Read(e) if e.is_not_found())
    }

    /// Check if the call was rejected before any read was issued.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Read(e) if e.is_precondition())
    }

    /// Check if this error is a configuration problem.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Individual causes, when this wraps an aggregate of per-item failures.
    pub fn causes(&self) -> Option<&ErrorList> {
        match self {
            Error::Read(tracestore_core::Error::Aggregate(list)) => Some(list),
            _ => None,
        }
    }
}

impl From<tracestore_core::Error> for Error {
    fn from(e: tracestore_core::Error) -> Self {
        match e {
            tracestore_core::Error::Config(msg) => Error::Config(msg),
            other => Error::Read(other),
        }
    }
}
