//! Build automation tasks for taxalign
//!
//! - `generate-cli-docs`: write the CLI reference from the clap definitions
//! - `check-cli-docs`: fail when the committed reference is out of date

use anyhow::{bail, Context};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

const REFERENCE_FILE: &str = "cli-reference.md";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for taxalign", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: PathBuf,
    },

    /// Compare the committed CLI reference with the current definitions
    CheckCliDocs {
        #[arg(short, long, default_value = "docs")]
        output_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
        Command::CheckCliDocs { output_dir } => check_cli_docs(&output_dir)?,
    }

    Ok(())
}

/// Reference body without the date line, so checks are stable across days
fn reference_body() -> String {
    let commands = clap_markdown::help_markdown::<taxalign_cli::Cli>();

    format!(
        r#"## Overview

`taxalign` reconciles taxon records between two SQLite reference tables: an
authority (records under review) and a catalogue (records they are matched
against). Column names are discovered per table, so exports with different
headers can be compared directly.

## Quick Start

```bash
# Resolve a name against the catalogue
taxalign match --db backbone.sqlite --name "Manta alfredi"

# Root-first lineage of a record
taxalign lineage --db backbone.sqlite --id 5

# Crosscheck every authority record, showing only problems
taxalign crosscheck \
  --authority-db redlist.sqlite \
  --catalogue-db backbone.sqlite \
  --problems-only
```

## Commands

{commands}

## Environment Variables

- `TAXALIGN_CONFIG` - TOML configuration file
- `TAXALIGN_AUTHORITY_DB`, `TAXALIGN_AUTHORITY_TABLE`, `TAXALIGN_AUTHORITY_LABEL`
- `TAXALIGN_CATALOGUE_DB`, `TAXALIGN_CATALOGUE_TABLE`, `TAXALIGN_CATALOGUE_LABEL`
- `TAXALIGN_LOG_LEVEL`, `TAXALIGN_LOG_OUTPUT`, `TAXALIGN_LOG_FORMAT`, `TAXALIGN_LOG_DIR`, `TAXALIGN_LOG_FILTER`

## Configuration

Values are layered: built-in defaults, then the TOML file, then the
environment (a `.env` file is read first), then command-line flags.

```toml
[authority]
database = "redlist.sqlite"
table = "assessments"
label = "iucn"

[catalogue]
database = "backbone.sqlite"
label = "gbif"

[catalogue.columns]
genus = ["genus_name"]
```
"#
    )
}

fn reference_path(output_dir: &Path) -> PathBuf {
    output_dir.join(REFERENCE_FILE)
}

fn generate_cli_docs(output_dir: &Path) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let content = format!(
        "# taxalign CLI Reference\n\nGenerated from the CLI source code on {}.\n\n{}",
        chrono::Utc::now().format("%Y-%m-%d"),
        reference_body()
    );

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let file_path = reference_path(output_dir);
    fs::write(&file_path, content)?;

    println!("✅ Generated CLI documentation at: {}", file_path.display());
    Ok(())
}

fn check_cli_docs(output_dir: &Path) -> anyhow::Result<()> {
    let file_path = reference_path(output_dir);
    let committed = fs::read_to_string(&file_path)
        .with_context(|| format!("reading {}", file_path.display()))?;

    if !committed.ends_with(&reference_body()) {
        bail!(
            "{} is out of date; run `cargo run -p xtask -- generate-cli-docs`",
            file_path.display()
        );
    }

    println!("✅ CLI documentation is up to date");
    Ok(())
}
