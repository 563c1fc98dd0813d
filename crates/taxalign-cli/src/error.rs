//! Error types for the taxalign CLI
//!
//! Messages are user-facing and say what to change.

use taxalign_common::TaxalignError;
use taxalign_core::EngineError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Neither flag, environment nor config file named a database
    #[error("No database configured for the {0} dataset. Pass --db or set TAXALIGN_{upper}_DB.", upper = .0.to_uppercase())]
    MissingDatabase(String),

    #[error("Database file not found: '{0}'. Verify the path exists and is readable.")]
    DatabaseNotFound(String),

    /// Lookup, lineage or crosscheck failed in the engine
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}. Check your environment variables or config file.")]
    Config(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Taxon '{0}' not found in table '{1}'.")]
    TaxonNotFound(String, String),

    #[error(transparent)]
    Common(#[from] TaxalignError),

    #[error("Failed to parse config file: {0}. Check the TOML syntax.")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File operation failed: {0}. Check file permissions.")]
    Io(#[from] std::io::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid query error
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    pub fn taxon_not_found(id: impl Into<String>, table: impl Into<String>) -> Self {
        Self::TaxonNotFound(id.into(), table.into())
    }

    /// True when a shutdown signal stopped the command
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Engine(e) if e.is_cancelled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_database_names_env_var() {
        let err = CliError::MissingDatabase("catalogue".to_string());
        assert!(err.to_string().contains("TAXALIGN_CATALOGUE_DB"));
    }

    #[test]
    fn test_engine_error_converts() {
        let err: CliError = EngineError::Cancelled.into();
        assert_eq!(err.to_string(), "Engine error: Operation cancelled");
        assert!(err.is_cancelled());
        assert!(!CliError::MissingDatabase("catalogue".to_string()).is_cancelled());
    }
}
