//! Engine error types

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures the engine cannot absorb locally
///
/// Data-quality gaps (blank names, parent cycles, dangling accepted-name
/// pointers, missing columns) are never errors; they degrade to empty or
/// `None` results instead.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Underlying SQLite query or metadata probe failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Metadata probe returned no columns for the table
    #[error("Table '{0}' does not exist or has no columns")]
    UnknownTable(String),

    /// A non-SQLite source failed
    #[error("Data source error: {0}")]
    Source(String),

    /// The caller's cancellation token fired
    #[error("Operation cancelled")]
    Cancelled,
}

impl EngineError {
    /// Create a generic data source error
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Return [`EngineError::Cancelled`] once `token` has fired
pub fn ensure_active(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        Err(EngineError::Cancelled)
    } else {
        Ok(())
    }
}
