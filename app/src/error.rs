//! Unified error handling for the console host.

use crate::config::ConfigError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Engine(#[from] vitrina_engine::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }
}

/// Result type alias for the host.
pub type Result<T> = std::result::Result<T, AppError>;
