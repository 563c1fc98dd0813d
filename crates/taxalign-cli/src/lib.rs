//! Taxalign CLI Library
//!
//! Command-line driver for the reconciliation engine over SQLite exports.
//!
//! # Overview
//!
//! - **Matching**: resolve a name or name components against one dataset (`taxalign match`)
//! - **Lineage**: print the root-first parent chain of a record (`taxalign lineage`)
//! - **Crosscheck**: compare authority records against the catalogue (`taxalign crosscheck`)
//! - **Schema**: show how a table's columns were mapped (`taxalign schema`)

pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod shutdown;

// Re-export commonly used types
pub use config::{Config, Dataset};
pub use error::{CliError, Result};
pub use output::OutputFormat;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Taxalign - taxon reconciliation between reference datasets
#[derive(Parser, Debug)]
#[command(name = "taxalign")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(short, long, env = "TAXALIGN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Print the full CLI reference as markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Which table to read, overriding the configuration
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Configured dataset to use
    #[arg(short, long, value_enum, default_value_t = Dataset::Catalogue)]
    pub dataset: Dataset,

    /// SQLite database file (overrides the dataset's configured path)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Table name (overrides the dataset's configured table)
    #[arg(short, long)]
    pub table: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a name or genus/species components to a record
    Match {
        #[command(flatten)]
        source: DatasetArgs,

        /// Full scientific name
        #[arg(short, long)]
        name: Option<String>,

        /// Genus component
        #[arg(long)]
        genus: Option<String>,

        /// Specific epithet component
        #[arg(long)]
        species: Option<String>,

        /// Infraspecific epithet component
        #[arg(long)]
        infra: Option<String>,

        /// Expect a subspecies/variety/form (derived from the query when omitted)
        #[arg(long)]
        infra_rank: Option<bool>,

        /// Run both name and component lookups and merge their candidates
        #[arg(long)]
        exhaustive: bool,
    },

    /// Print the root-first parent chain of a record
    Lineage {
        #[command(flatten)]
        source: DatasetArgs,

        /// Record identifier
        #[arg(long)]
        id: String,
    },

    /// Compare authority records against the catalogue
    Crosscheck {
        /// Check a single authority name instead of a batch
        #[arg(short, long)]
        name: Option<String>,

        /// Maximum number of authority records in a batch
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only print outcomes with a mismatch or no match
        #[arg(long)]
        problems_only: bool,

        /// Authority database (overrides configuration)
        #[arg(long)]
        authority_db: Option<PathBuf>,

        /// Authority table (overrides configuration)
        #[arg(long)]
        authority_table: Option<String>,

        /// Catalogue database (overrides configuration)
        #[arg(long)]
        catalogue_db: Option<PathBuf>,

        /// Catalogue table (overrides configuration)
        #[arg(long)]
        catalogue_table: Option<String>,
    },

    /// Show how a table's columns map onto taxon fields
    Schema {
        #[command(flatten)]
        source: DatasetArgs,
    },
}
