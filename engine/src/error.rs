//! Error types for the Vitrina engine.

use crate::Codigo;
use thiserror::Error;

/// All possible errors from the Vitrina engine.
///
/// Most of these never reach the presentation layer: the inventory engine
/// recovers storage problems locally and only duplicate rejection is
/// reported back to a caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Storage errors
    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    // Command errors
    #[error("product with codigo {0} already exists")]
    DuplicateCodigo(Codigo),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidPayload(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
