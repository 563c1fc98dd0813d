//! End-to-end tests for the taxalign binary
//!
//! These tests run the real binary against SQLite files written to a
//! temporary directory and cover:
//! - Name and component matching, table and JSON output
//! - Lineage traversal
//! - Single and batch crosschecks
//! - Schema mapping
//! - Configuration errors

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ENV_VARS: [&str; 9] = [
    "TAXALIGN_CONFIG",
    "TAXALIGN_AUTHORITY_DB",
    "TAXALIGN_AUTHORITY_TABLE",
    "TAXALIGN_AUTHORITY_LABEL",
    "TAXALIGN_CATALOGUE_DB",
    "TAXALIGN_CATALOGUE_TABLE",
    "TAXALIGN_CATALOGUE_LABEL",
    "TAXALIGN_LOG_LEVEL",
    "TAXALIGN_LOG_OUTPUT",
];

/// Temporary directory holding a catalogue and an authority database
struct Fixture {
    dir: TempDir,
    catalogue: PathBuf,
    authority: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let catalogue = dir.path().join("catalogue.sqlite");
        let authority = dir.path().join("authority.sqlite");
        write_catalogue(&catalogue);
        write_authority(&authority);
        Self {
            dir,
            catalogue,
            authority,
        }
    }

    /// Binary with a clean environment, run inside the temp directory
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taxalign").unwrap();
        for key in ENV_VARS {
            cmd.env_remove(key);
        }
        cmd.current_dir(self.dir.path());
        cmd
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().args(args).args(["--format", "json"]).output().unwrap();
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

fn write_catalogue(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE taxon (
            taxonID TEXT PRIMARY KEY,
            scientificName TEXT,
            scientificNameAuthorship TEXT,
            taxonomicStatus TEXT,
            taxonRank TEXT,
            acceptedNameUsageID TEXT,
            parentNameUsageID TEXT,
            kingdom TEXT,
            genus TEXT,
            specificEpithet TEXT,
            infraspecificEpithet TEXT
        );
        INSERT INTO taxon VALUES
            ('1', 'Animalia', NULL, 'accepted', 'kingdom', NULL, NULL, 'Animalia', NULL, NULL, NULL),
            ('2', 'Chordata', NULL, 'accepted', 'phylum', NULL, '1', 'Animalia', NULL, NULL, NULL),
            ('3', 'Mobulidae', NULL, 'accepted', 'family', NULL, '2', 'Animalia', NULL, NULL, NULL),
            ('4', 'Mobula', NULL, 'accepted', 'genus', NULL, '3', 'Animalia', 'Mobula', NULL, NULL),
            ('5', 'Mobula alfredi', '(Krefft, 1868)', 'accepted', 'species', NULL, '4', 'Animalia', 'Mobula', 'alfredi', NULL),
            ('6', 'Manta alfredi', 'Krefft, 1868', 'synonym', 'species', '5', '4', 'Animalia', 'Manta', 'alfredi', NULL),
            ('9', 'Panthera leo persica', 'Meyer, 1826', 'accepted', 'subspecies', NULL, NULL, 'Animalia', 'Panthera', 'leo', 'persica');",
    )
    .unwrap();
}

fn write_authority(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE assessments (
            internalTaxonId INTEGER,
            scientificName TEXT,
            authority TEXT,
            kingdomName TEXT,
            phylumName TEXT,
            familyName TEXT,
            genusName TEXT,
            speciesName TEXT,
            infraName TEXT,
            taxonRank TEXT
        );
        INSERT INTO assessments VALUES
            (101, 'Mobula alfredi', '( Krefft,1868)', 'ANIMALIA', 'CHORDATA', 'MOBULIDAE', 'Mobula', 'alfredi', NULL, 'species'),
            (102, 'Manta alfredi', 'Krefft 1868', 'ANIMALIA', 'CHORDATA', 'MOBULIDAE', 'Manta', 'alfredi', NULL, 'species'),
            (103, 'Panthera leo persica', 'Meyer, 1826', 'ANIMALIA', 'CHORDATA', 'FELIDAE', 'Panthera', 'leo', 'persica', 'subspecies'),
            (104, 'Mobula thurstoni', NULL, 'ANIMALIA', 'CHORDATA', 'MOBULIDAE', 'Mobula', 'thurstoni', NULL, 'species');",
    )
    .unwrap();
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// match
// ============================================================================

#[test]
fn test_match_by_name_table_output() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["match", "--name", "Mobula alfredi", "--db", path_arg(&fx.catalogue)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mobula alfredi"))
        .stdout(predicate::str::contains("(Krefft, 1868)"))
        .stdout(predicate::str::contains("scientificName"));
}

#[test]
fn test_match_synonym_reports_accepted_record() {
    let fx = Fixture::new();
    let json = fx.json(&["match", "--name", "Manta alfredi", "--db", path_arg(&fx.catalogue)]);

    assert_eq!(json["primary"]["id"], "6");
    assert_eq!(json["accepted"]["id"], "5");
    assert_eq!(json["method"], "scientificName");
}

#[test]
fn test_match_by_components() {
    let fx = Fixture::new();
    let json = fx.json(&[
        "match",
        "--genus",
        "panthera",
        "--species",
        "LEO",
        "--infra",
        "persica",
        "--db",
        path_arg(&fx.catalogue),
    ]);

    assert_eq!(json["primary"]["id"], "9");
    assert_eq!(json["method"], "components");
}

#[test]
fn test_match_not_found_is_not_an_error() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["match", "--name", "Mobula nobody", "--db", path_arg(&fx.catalogue)])
        .assert()
        .success()
        .stdout(predicate::str::contains("No match for"));

    let json = fx.json(&["match", "--name", "Mobula nobody", "--db", path_arg(&fx.catalogue)]);
    assert_eq!(json["method"], "none");
    assert!(json["primary"].is_null());
}

#[test]
fn test_match_against_authority_dataset() {
    let fx = Fixture::new();
    let json = fx.json(&[
        "match",
        "--dataset",
        "authority",
        "--name",
        "Mobula thurstoni",
        "--db",
        path_arg(&fx.authority),
    ]);
    assert_eq!(json["primary"]["id"], "104");
}

#[test]
fn test_match_requires_query() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["match", "--genus", "Mobula", "--db", path_arg(&fx.catalogue)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--genus and --species"));
}

// ============================================================================
// lineage
// ============================================================================

#[test]
fn test_lineage_is_root_first() {
    let fx = Fixture::new();
    let json = fx.json(&["lineage", "--id", "5", "--db", path_arg(&fx.catalogue)]);

    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["scientific_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Animalia", "Chordata", "Mobulidae", "Mobula", "Mobula alfredi"]);
}

#[test]
fn test_lineage_unknown_id_fails() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["lineage", "--id", "404", "--db", path_arg(&fx.catalogue)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'404' not found in table 'taxon'"));
}

// ============================================================================
// crosscheck
// ============================================================================

fn crosscheck_args<'a>(fx: &'a Fixture) -> Vec<&'a str> {
    vec![
        "crosscheck",
        "--authority-db",
        path_arg(&fx.authority),
        "--catalogue-db",
        path_arg(&fx.catalogue),
    ]
}

#[test]
fn test_crosscheck_batch_summary() {
    let fx = Fixture::new();
    let json = fx.json(&crosscheck_args(&fx));

    let summary = &json["summary"];
    assert_eq!(summary["checked"], 4);
    assert_eq!(summary["found"], 3);
    assert_eq!(summary["not_found"], 1);
    assert_eq!(summary["synonym_redirects"], 1);
    assert_eq!(json["outcomes"].as_array().unwrap().len(), 4);
}

#[test]
fn test_crosscheck_problems_only_filters_outcomes() {
    let fx = Fixture::new();
    let mut args = crosscheck_args(&fx);
    args.push("--problems-only");
    let json = fx.json(&args);

    let ids: Vec<&str> = json["outcomes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["subject"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["102", "104"]);
    assert_eq!(json["summary"]["checked"], 4);
}

#[test]
fn test_crosscheck_single_name_table_output() {
    let fx = Fixture::new();
    let mut args = crosscheck_args(&fx);
    args.extend(["--name", "Manta alfredi"]);
    fx.cmd()
        .args(&args)
        .assert()
        .success()
        .stdout(predicate::str::contains("synonym of"))
        .stdout(predicate::str::contains("Mobula alfredi"))
        .stdout(predicate::str::contains("genus"))
        .stdout(predicate::str::contains("mismatch"));
}

#[test]
fn test_crosscheck_labels_from_config_file() {
    let fx = Fixture::new();
    let config = fx.dir.path().join("taxalign.toml");
    std::fs::write(
        &config,
        format!(
            "[authority]\ndatabase = {:?}\nlabel = \"iucn\"\n\n[catalogue]\ndatabase = {:?}\nlabel = \"gbif\"\n",
            path_arg(&fx.authority),
            path_arg(&fx.catalogue)
        ),
    )
    .unwrap();

    let json = fx.json(&["crosscheck", "--name", "Mobula alfredi", "--config", path_arg(&config)]);
    assert_eq!(json["alignment"]["labels"], serde_json::json!(["iucn", "gbif"]));
    assert_eq!(json["authority"], "equivalent");
}

#[test]
fn test_crosscheck_without_databases_names_env_var() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("crosscheck")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TAXALIGN_AUTHORITY_DB"));
}

// ============================================================================
// schema and configuration errors
// ============================================================================

#[test]
fn test_schema_shows_resolved_columns() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["schema", "--dataset", "authority", "--db", path_arg(&fx.authority)])
        .assert()
        .success()
        .stdout(predicate::str::contains("internalTaxonId"))
        .stdout(predicate::str::contains("genusName"));
}

#[test]
fn test_missing_database_file() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["schema", "--db", "does-not-exist.sqlite"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Database file not found"));
}

#[test]
fn test_database_from_environment() {
    let fx = Fixture::new();
    fx.cmd()
        .env("TAXALIGN_CATALOGUE_DB", &fx.catalogue)
        .args(["lineage", "--id", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mobulidae"));
}

#[test]
fn test_no_subcommand_exits_with_usage() {
    let fx = Fixture::new();
    fx.cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("A subcommand is required"));
}
