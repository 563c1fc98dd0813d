//! `taxalign lineage` command implementation

use crate::commands::{dataset_from_args, open_store};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{render_lineage, OutputFormat};
use crate::DatasetArgs;
use taxalign_core::CancellationToken;

/// Print the root-first parent chain of record `id`
pub fn run(
    config: &Config,
    source: &DatasetArgs,
    id: &str,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<()> {
    let settings = dataset_from_args(config, source);
    let mut store = open_store(source.dataset, &settings)?.with_cancellation(cancel.clone());

    let record = store
        .get_by_id(id)?
        .ok_or_else(|| CliError::taxon_not_found(id, store.table()))?;
    let chain = store.get_parent_chain(&record)?;

    print!("{}", render_lineage(&chain, format)?);
    Ok(())
}
