//! Error types shared across taxalign crates

use thiserror::Error;

/// Result type alias for shared taxalign operations
pub type Result<T> = std::result::Result<T, TaxalignError>;

/// Errors raised by configuration, logging and other shared plumbing
#[derive(Error, Debug)]
pub enum TaxalignError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl TaxalignError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid-value error for a named setting
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}
