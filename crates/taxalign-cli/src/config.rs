//! Configuration for the taxalign CLI
//!
//! Two datasets are configured: the authority (records under review) and the
//! catalogue (records matched against). Values are layered, later wins:
//!
//! 1. built-in defaults
//! 2. TOML file passed with `--config`
//! 3. environment (`TAXALIGN_AUTHORITY_*`, `TAXALIGN_CATALOGUE_*`), after `.env`
//! 4. command-line flags, applied by each command
//!
//! ```toml
//! [authority]
//! database = "redlist.sqlite"
//! table = "assessments"
//!
//! [catalogue]
//! database = "backbone.sqlite"
//! label = "gbif"
//!
//! [catalogue.columns]
//! genus = ["genus_name"]
//! ```

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use taxalign_common::env::string_var;
use taxalign_core::record::TaxonField;
use taxalign_core::store::SchemaProfile;

// ============================================================================
// CLI Configuration Constants
// ============================================================================

pub const DEFAULT_AUTHORITY_TABLE: &str = "assessments";
pub const DEFAULT_AUTHORITY_LABEL: &str = "authority";
pub const DEFAULT_CATALOGUE_TABLE: &str = "taxon";
pub const DEFAULT_CATALOGUE_LABEL: &str = "catalogue";

/// Which configured dataset a command reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Authority,
    Catalogue,
}

impl Dataset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authority => "authority",
            Self::Catalogue => "catalogue",
        }
    }

    fn env_prefix(self) -> &'static str {
        match self {
            Self::Authority => "TAXALIGN_AUTHORITY",
            Self::Catalogue => "TAXALIGN_CATALOGUE",
        }
    }
}

/// One reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub database: Option<PathBuf>,
    pub table: String,
    /// Column header in alignments
    pub label: String,
    /// Canonical field name → extra candidate columns, tried first
    #[serde(default)]
    pub columns: BTreeMap<String, Vec<String>>,
}

impl DatasetConfig {
    fn with_defaults(table: &str, label: &str) -> Self {
        Self {
            database: None,
            table: table.to_string(),
            label: label.to_string(),
            columns: BTreeMap::new(),
        }
    }

    /// Default profile with the configured column overrides prepended
    pub fn schema_profile(&self) -> Result<SchemaProfile> {
        let mut profile = SchemaProfile::default();
        for (field, columns) in &self.columns {
            let field: TaxonField = field.parse().map_err(CliError::config)?;
            profile = profile.with_candidates(field, columns.iter().cloned());
        }
        Ok(profile)
    }

    fn overlay(&mut self, file: DatasetOverlay) {
        if let Some(database) = file.database {
            self.database = Some(database);
        }
        if let Some(table) = file.table {
            self.table = table;
        }
        if let Some(label) = file.label {
            self.label = label;
        }
        self.columns.extend(file.columns);
    }

    fn merge_env(&mut self, dataset: Dataset) {
        let prefix = dataset.env_prefix();
        if let Some(database) = string_var(&format!("{prefix}_DB")) {
            self.database = Some(PathBuf::from(database));
        }
        if let Some(table) = string_var(&format!("{prefix}_TABLE")) {
            self.table = table;
        }
        if let Some(label) = string_var(&format!("{prefix}_LABEL")) {
            self.label = label;
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub authority: DatasetConfig,
    pub catalogue: DatasetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            authority: DatasetConfig::with_defaults(DEFAULT_AUTHORITY_TABLE, DEFAULT_AUTHORITY_LABEL),
            catalogue: DatasetConfig::with_defaults(DEFAULT_CATALOGUE_TABLE, DEFAULT_CATALOGUE_LABEL),
        }
    }
}

/// Partial dataset section as written in a config file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DatasetOverlay {
    database: Option<PathBuf>,
    table: Option<String>,
    label: Option<String>,
    columns: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    authority: Option<DatasetOverlay>,
    catalogue: Option<DatasetOverlay>,
}

impl Config {
    /// Defaults, then `path` (if any), then environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = path {
            config.apply_file(path)?;
        }
        config.merge_env();
        Ok(config)
    }

    /// Load config from environment variables only
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.merge_env();
        config
    }

    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::config(format!("cannot read '{}': {}", path.display(), e)))?;
        self.apply_toml(&text)
    }

    pub fn apply_toml(&mut self, text: &str) -> Result<()> {
        let file: FileConfig = toml::from_str(text)?;
        if let Some(authority) = file.authority {
            self.authority.overlay(authority);
        }
        if let Some(catalogue) = file.catalogue {
            self.catalogue.overlay(catalogue);
        }
        Ok(())
    }

    fn merge_env(&mut self) {
        self.authority.merge_env(Dataset::Authority);
        self.catalogue.merge_env(Dataset::Catalogue);
    }

    pub fn dataset(&self, dataset: Dataset) -> &DatasetConfig {
        match dataset {
            Dataset::Authority => &self.authority,
            Dataset::Catalogue => &self.catalogue,
        }
    }

    pub fn dataset_mut(&mut self, dataset: Dataset) -> &mut DatasetConfig {
        match dataset {
            Dataset::Authority => &mut self.authority,
            Dataset::Catalogue => &mut self.catalogue,
        }
    }
}
