//! `taxalign schema` command implementation
//!
//! Shows which actual column backs each taxon field, so column overrides can
//! be checked before running a crosscheck.

use crate::commands::{dataset_from_args, open_store};
use crate::config::Config;
use crate::error::Result;
use crate::output::{render_schema, OutputFormat};
use crate::DatasetArgs;

pub fn run(config: &Config, source: &DatasetArgs, format: OutputFormat) -> Result<()> {
    let settings = dataset_from_args(config, source);
    let store = open_store(source.dataset, &settings)?;
    print!("{}", render_schema(store.table(), store.column_map(), format)?);
    Ok(())
}
