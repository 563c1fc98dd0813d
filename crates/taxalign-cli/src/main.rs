//! Taxalign CLI - Main entry point

use clap::Parser;
use std::process;
use taxalign_cli::commands::crosscheck::CrosscheckTargets;
use taxalign_cli::commands::resolve::MatchQuery;
use taxalign_cli::{Cli, Commands, Config};
use taxalign_cli::shutdown::{self, EXIT_CANCELLED};
use taxalign_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use taxalign_core::CancellationToken;
use tracing::{error, warn};

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Handle markdown help generation
    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    // Ensure a command is provided
    let Some(command) = &cli.command else {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    };

    // .env is optional
    let _ = dotenvy::dotenv();

    // Verbose mode logs debug to the console; otherwise only warnings
    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Warn };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("taxalign-cli")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging
    let _guard = init_logging(&log_config).ok();

    // Ctrl+C stops long batches at the next record instead of killing the process
    let cancel = CancellationToken::new();
    if let Err(e) = shutdown::install(cancel.clone()) {
        warn!(error = %e, "Signal handling unavailable");
    }

    if let Err(e) = execute_command(&cli, command, &cancel) {
        if e.is_cancelled() {
            eprintln!("Cancelled");
            process::exit(EXIT_CANCELLED);
        }
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
fn execute_command(cli: &Cli, command: &Commands, cancel: &CancellationToken) -> taxalign_cli::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match command {
        Commands::Match {
            source,
            name,
            genus,
            species,
            infra,
            infra_rank,
            exhaustive,
        } => {
            let input = MatchQuery {
                name: name.clone(),
                genus: genus.clone(),
                species: species.clone(),
                infra: infra.clone(),
                infra_rank: *infra_rank,
            };
            taxalign_cli::commands::resolve::run(&config, source, &input, *exhaustive, cli.format, cancel)
        },

        Commands::Lineage { source, id } => {
            taxalign_cli::commands::lineage::run(&config, source, id, cli.format, cancel)
        },

        Commands::Crosscheck {
            name,
            limit,
            problems_only,
            authority_db,
            authority_table,
            catalogue_db,
            catalogue_table,
        } => {
            let targets = CrosscheckTargets {
                authority_db: authority_db.clone(),
                authority_table: authority_table.clone(),
                catalogue_db: catalogue_db.clone(),
                catalogue_table: catalogue_table.clone(),
            };
            taxalign_cli::commands::crosscheck::run(
                &config,
                &targets,
                name.as_deref(),
                *limit,
                *problems_only,
                cli.format,
                cancel,
            )
        },

        Commands::Schema { source } => taxalign_cli::commands::schema::run(&config, source, cli.format),
    }
}
