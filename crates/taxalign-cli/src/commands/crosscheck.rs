//! `taxalign crosscheck` command implementation
//!
//! Checks authority records against the catalogue, either one name or a
//! batch in authority-table order.

use crate::commands::{open_store, resolve_dataset};
use crate::config::{Config, Dataset};
use crate::error::{CliError, Result};
use crate::output::{render_json, render_outcome, render_summary, BatchReport, OutputFormat};
use std::path::PathBuf;
use taxalign_core::crosscheck::{CrosscheckOutcome, Crosschecker};
use taxalign_core::CancellationToken;
use tracing::info;

/// Flag overrides for the two datasets
#[derive(Debug, Clone, Default)]
pub struct CrosscheckTargets {
    pub authority_db: Option<PathBuf>,
    pub authority_table: Option<String>,
    pub catalogue_db: Option<PathBuf>,
    pub catalogue_table: Option<String>,
}

/// Outcomes worth showing with `--problems-only`
pub fn is_problem(outcome: &CrosscheckOutcome) -> bool {
    !outcome.is_found() || outcome.has_rank_mismatch() || outcome.has_authority_mismatch()
}

pub fn run(
    config: &Config,
    targets: &CrosscheckTargets,
    name: Option<&str>,
    limit: Option<usize>,
    problems_only: bool,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<()> {
    let authority = resolve_dataset(
        config,
        Dataset::Authority,
        targets.authority_db.clone(),
        targets.authority_table.clone(),
    );
    let catalogue = resolve_dataset(
        config,
        Dataset::Catalogue,
        targets.catalogue_db.clone(),
        targets.catalogue_table.clone(),
    );

    let mut checker = Crosschecker::new(
        open_store(Dataset::Authority, &authority)?,
        open_store(Dataset::Catalogue, &catalogue)?,
    )
    .with_labels(authority.label.clone(), catalogue.label.clone())
    .with_cancellation(cancel.clone());

    if let Some(name) = name {
        let outcome = checker
            .check_name(name)?
            .ok_or_else(|| CliError::taxon_not_found(name, authority.table.clone()))?;
        let text = match format {
            OutputFormat::Json => render_json(&outcome)?,
            OutputFormat::Table => render_outcome(&outcome),
        };
        print!("{text}");
        return Ok(());
    }

    let mut collected: Vec<CrosscheckOutcome> = Vec::new();
    let summary = checker.run_batch(limit, |outcome| {
        if problems_only && !is_problem(outcome) {
            return;
        }
        match format {
            OutputFormat::Table => print!("{}", render_outcome(outcome)),
            OutputFormat::Json => collected.push(outcome.clone()),
        }
    })?;

    info!(checked = summary.checked, "Crosscheck finished");
    match format {
        OutputFormat::Table => print!("{}", render_summary(&summary)),
        OutputFormat::Json => {
            let report = BatchReport {
                outcomes: &collected,
                summary: &summary,
            };
            print!("{}", render_json(&report)?);
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_db(path: &Path, sql: &str) {
        Connection::open(path).unwrap().execute_batch(sql).unwrap();
    }

    fn targets(dir: &TempDir) -> CrosscheckTargets {
        let authority = dir.path().join("authority.sqlite");
        let catalogue = dir.path().join("catalogue.sqlite");
        write_db(
            &authority,
            "CREATE TABLE assessments (internalTaxonId INTEGER, scientificName TEXT);
             INSERT INTO assessments VALUES (1, 'Mobula alfredi'), (2, 'Mobula birostris');",
        );
        write_db(
            &catalogue,
            "CREATE TABLE taxon (taxonID TEXT, scientificName TEXT);
             INSERT INTO taxon VALUES ('5', 'Mobula alfredi');",
        );
        CrosscheckTargets {
            authority_db: Some(authority),
            catalogue_db: Some(catalogue),
            ..CrosscheckTargets::default()
        }
    }

    #[test]
    fn test_cancelled_batch_stops_with_cancellation_error() {
        let dir = TempDir::new().unwrap();
        let targets = targets(&dir);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = run(&Config::default(), &targets, None, None, false, OutputFormat::Json, &cancel).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_cancelled_single_name_check() {
        let dir = TempDir::new().unwrap();
        let targets = targets(&dir);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = run(
            &Config::default(),
            &targets,
            Some("Mobula alfredi"),
            None,
            false,
            OutputFormat::Table,
            &cancel,
        )
        .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_problem_filter() {
        let dir = TempDir::new().unwrap();
        let targets = targets(&dir);
        let config = Config::default();
        let authority = resolve_dataset(&config, Dataset::Authority, targets.authority_db.clone(), None);
        let catalogue = resolve_dataset(&config, Dataset::Catalogue, targets.catalogue_db.clone(), None);
        let mut checker = Crosschecker::new(
            open_store(Dataset::Authority, &authority).unwrap(),
            open_store(Dataset::Catalogue, &catalogue).unwrap(),
        );

        let mut problems = Vec::new();
        checker
            .run_batch(None, |outcome| {
                if is_problem(outcome) {
                    problems.push(outcome.subject.scientific_name.clone());
                }
            })
            .unwrap();
        assert_eq!(problems, vec!["Mobula birostris"]);
    }
}
