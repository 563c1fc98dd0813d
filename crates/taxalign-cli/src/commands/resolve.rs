//! `taxalign match` command implementation
//!
//! Resolves one query against a single dataset and prints the primary match,
//! its accepted name and the other candidates.

use crate::commands::{dataset_from_args, open_store};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{render_match, OutputFormat};
use crate::DatasetArgs;
use taxalign_core::matcher::{MatchResolver, SearchMode};
use taxalign_core::record::QueryTaxon;
use taxalign_core::CancellationToken;
use tracing::info;

/// Lookup inputs as given on the command line
#[derive(Debug, Clone, Default)]
pub struct MatchQuery {
    pub name: Option<String>,
    pub genus: Option<String>,
    pub species: Option<String>,
    pub infra: Option<String>,
    pub infra_rank: Option<bool>,
}

impl MatchQuery {
    /// Build the engine query; fails when nothing usable was given
    pub fn to_query(&self) -> Result<QueryTaxon> {
        let mut query = match (&self.genus, &self.species) {
            (Some(genus), Some(species)) => QueryTaxon::from_components(genus, species, self.infra.as_deref()),
            (None, None) => QueryTaxon::default(),
            _ => return Err(CliError::invalid_query("--genus and --species must be given together")),
        };
        if let Some(name) = &self.name {
            query = query.with_name(name);
        }
        if let Some(expected) = self.infra_rank {
            query = query.with_infra_rank(expected);
        }

        if query.scientific_name.is_none() && !query.has_components() {
            return Err(CliError::invalid_query("pass --name, or --genus with --species"));
        }
        Ok(query)
    }
}

pub fn run(
    config: &Config,
    source: &DatasetArgs,
    input: &MatchQuery,
    exhaustive: bool,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<()> {
    let query = input.to_query()?;
    let settings = dataset_from_args(config, source);
    let mut store = open_store(source.dataset, &settings)?.with_cancellation(cancel.clone());

    let search = if exhaustive { SearchMode::Exhaustive } else { SearchMode::FirstHit };
    let result = MatchResolver::default()
        .with_search_mode(search)
        .resolve(&mut store, &query)?;

    info!(
        table = store.table(),
        query = %query.display_name(),
        found = result.is_found(),
        "Match finished"
    );
    print!("{}", render_match(&query, &result, format)?);
    Ok(())
}
