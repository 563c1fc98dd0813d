//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod crosscheck;
pub mod lineage;
pub mod resolve;
pub mod schema;

use crate::config::{Config, Dataset, DatasetConfig};
use crate::error::{CliError, Result};
use crate::DatasetArgs;
use rusqlite::Connection;
use std::path::PathBuf;
use taxalign_core::source::sqlite::open_read_only;
use taxalign_core::store::TaxonStore;

/// Configured dataset with `--db` / `--table` flags applied
pub fn resolve_dataset(config: &Config, dataset: Dataset, db: Option<PathBuf>, table: Option<String>) -> DatasetConfig {
    let mut resolved = config.dataset(dataset).clone();
    if let Some(db) = db {
        resolved.database = Some(db);
    }
    if let Some(table) = table {
        resolved.table = table;
    }
    resolved
}

pub fn dataset_from_args(config: &Config, args: &DatasetArgs) -> DatasetConfig {
    resolve_dataset(config, args.dataset, args.db.clone(), args.table.clone())
}

/// Open a read-only store over one dataset
pub fn open_store(dataset: Dataset, settings: &DatasetConfig) -> Result<TaxonStore<Connection>> {
    let path = settings
        .database
        .as_ref()
        .ok_or_else(|| CliError::MissingDatabase(dataset.as_str().to_string()))?;
    if !path.is_file() {
        return Err(CliError::DatabaseNotFound(path.display().to_string()));
    }

    let conn = open_read_only(path)?;
    let profile = settings.schema_profile()?;
    Ok(TaxonStore::with_profile(conn, &settings.table, &profile)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let config = Config::default();
        let resolved = resolve_dataset(&config, Dataset::Authority, Some("a.sqlite".into()), None);
        assert_eq!(resolved.database, Some(PathBuf::from("a.sqlite")));
        assert_eq!(resolved.table, crate::config::DEFAULT_AUTHORITY_TABLE);
    }

    #[test]
    fn test_open_store_requires_database() {
        let settings = Config::default().catalogue;
        let err = open_store(Dataset::Catalogue, &settings).err().unwrap();
        assert!(matches!(err, CliError::MissingDatabase(_)));

        let mut settings = settings;
        settings.database = Some(PathBuf::from("/definitely/not/here.sqlite"));
        let err = open_store(Dataset::Catalogue, &settings).err().unwrap();
        assert!(matches!(err, CliError::DatabaseNotFound(_)));
    }
}
