//! Console rendering for command results
//!
//! Every renderer returns the full text so commands decide where it goes.

use crate::error::Result;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Table};
use serde::Serialize;
use taxalign_core::alignment::{Agreement, AlignmentResult};
use taxalign_core::crosscheck::{CrosscheckOutcome, CrosscheckSummary};
use taxalign_core::matcher::MatchResult;
use taxalign_core::record::{QueryTaxon, TaxonField, TaxonRecord};
use taxalign_core::store::ColumnMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|h| Cell::new(h)).collect::<Vec<_>>());
    table
}

fn text(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn record_row(role: &str, record: &TaxonRecord) -> Vec<String> {
    vec![
        role.to_string(),
        record.id.clone(),
        record.scientific_name.clone(),
        text(record.authorship.as_deref()).to_string(),
        text(record.status.as_deref()).to_string(),
        text(record.rank.as_deref()).to_string(),
    ]
}

// ============================================================================
// match
// ============================================================================

#[derive(Serialize)]
struct MatchReport<'a> {
    query: &'a QueryTaxon,
    method: String,
    #[serde(flatten)]
    result: &'a MatchResult,
}

pub fn render_match(query: &QueryTaxon, result: &MatchResult, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        let report = MatchReport {
            query,
            method: result.method_label(),
            result,
        };
        return render_json(&report);
    }

    let Some(primary) = &result.primary else {
        return Ok(format!("{} '{}'\n", "No match for".yellow(), query.display_name()));
    };

    let mut table = new_table(&["Role", "ID", "Scientific name", "Authorship", "Status", "Rank"]);
    table.add_row(record_row("primary", primary));
    match &result.accepted {
        Some(accepted) if accepted.id != primary.id => {
            table.add_row(record_row("accepted", accepted));
        },
        Some(_) => {},
        None => {
            if let Some(pointer) = primary.accepted_pointer() {
                table.add_row(vec!["accepted", pointer, "(unresolved)", "", "", ""]);
            }
        },
    }
    for candidate in result.candidates.iter().filter(|c| c.id != primary.id) {
        table.add_row(record_row("candidate", candidate));
    }

    Ok(format!(
        "{} {}  {} {}\n{}\n",
        "Query:".cyan().bold(),
        query.display_name(),
        "Method:".cyan().bold(),
        result.method_label(),
        table
    ))
}

// ============================================================================
// lineage
// ============================================================================

pub fn render_lineage(chain: &[TaxonRecord], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return render_json(chain);
    }

    let mut table = new_table(&["Depth", "Rank", "Scientific name", "ID"]);
    for (depth, record) in chain.iter().enumerate() {
        table.add_row(vec![
            depth.to_string(),
            text(record.rank.as_deref()).to_string(),
            record.scientific_name.clone(),
            record.id.clone(),
        ]);
    }
    Ok(format!("{table}\n"))
}

// ============================================================================
// crosscheck
// ============================================================================

fn agreement_marker(agreement: Agreement) -> String {
    match agreement {
        Agreement::Agree => "✓".green().to_string(),
        Agreement::Disagree => "✗ mismatch".red().bold().to_string(),
        Agreement::Partial => "– missing".yellow().to_string(),
    }
}

pub fn alignment_table(alignment: &AlignmentResult) -> Table {
    let mut header = vec!["Rank"];
    header.extend(alignment.labels().iter().map(String::as_str));
    header.push("");
    let mut table = new_table(&header);

    for row in alignment.rows() {
        let mut cells = vec![row.rank.clone()];
        cells.extend(
            alignment
                .labels()
                .iter()
                .map(|label| text(row.get(label)).to_string()),
        );
        cells.push(agreement_marker(alignment.agreement(row)));
        table.add_row(cells);
    }
    table
}

/// Table rendering of one outcome
pub fn render_outcome(outcome: &CrosscheckOutcome) -> String {
    let subject = &outcome.subject;
    let mut out = format!(
        "{} {} ({})\n",
        "Subject:".cyan().bold(),
        subject.scientific_name,
        subject.id
    );

    let Some(primary) = &outcome.match_result.primary else {
        out.push_str(&format!("  {}\n", "not found".yellow().bold()));
        return out;
    };

    out.push_str(&format!(
        "  matched {} ({}) via {}\n",
        primary.scientific_name,
        primary.id,
        outcome.match_result.method_label()
    ));
    if outcome.match_result.is_synonym_redirect() {
        if let Some(accepted) = &outcome.match_result.accepted {
            out.push_str(&format!(
                "  {} {} ({})\n",
                "synonym of".magenta(),
                accepted.scientific_name,
                accepted.id
            ));
        }
    }
    if let Some(verdict) = outcome.authority {
        let verdict_text = if verdict.is_mismatch() {
            verdict.to_string().red().to_string()
        } else {
            verdict.to_string().green().to_string()
        };
        out.push_str(&format!(
            "  authorship: {} vs {} ({})\n",
            text(subject.authorship.as_deref()),
            text(primary.authorship.as_deref()),
            verdict_text
        ));
    }
    out.push_str(&format!("{}\n", alignment_table(&outcome.alignment)));
    out
}

pub fn render_summary(summary: &CrosscheckSummary) -> String {
    let mut table = new_table(&["Checked", "Found", "Not found", "Synonym redirects", "Authority mismatches", "Rank mismatches"]);
    table.add_row(vec![
        summary.checked.to_string(),
        summary.found.to_string(),
        summary.not_found.to_string(),
        summary.synonym_redirects.to_string(),
        summary.authority_mismatches.to_string(),
        summary.rank_mismatches.to_string(),
    ]);
    format!("{}\n{}\n", "Summary:".cyan().bold(), table)
}

#[derive(Serialize)]
pub struct BatchReport<'a> {
    pub outcomes: &'a [CrosscheckOutcome],
    pub summary: &'a CrosscheckSummary,
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}

// ============================================================================
// schema
// ============================================================================

#[derive(Serialize)]
struct SchemaReport<'a> {
    table: &'a str,
    mapped: Vec<(TaxonField, &'a str)>,
    unmapped: Vec<TaxonField>,
}

pub fn render_schema(table_name: &str, columns: &ColumnMap, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        let report = SchemaReport {
            table: table_name,
            mapped: columns.mapped(),
            unmapped: columns.unmapped(),
        };
        return render_json(&report);
    }

    let mut table = new_table(&["Field", "Column"]);
    for field in TaxonField::ALL {
        let column = match columns.column(field) {
            Some(column) => column.to_string(),
            None => "(absent)".dimmed().to_string(),
        };
        table.add_row(vec![field.to_string(), column]);
    }
    Ok(format!("{} {}\n{}\n", "Table:".cyan().bold(), table_name, table))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use taxalign_core::alignment::align;
    use taxalign_core::ladder::RankLadder;

    #[test]
    fn test_render_match_not_found() {
        let query = QueryTaxon::from_name("Nobody");
        let text = render_match(&query, &MatchResult::default(), OutputFormat::Table).unwrap();
        assert!(text.contains("Nobody"));
    }

    #[test]
    fn test_render_match_json_has_method() {
        let query = QueryTaxon::from_name("Mobula alfredi");
        let record = TaxonRecord::new("5", "Mobula alfredi");
        let result = MatchResult {
            primary: Some(record.clone()),
            accepted: Some(record.clone()),
            candidates: vec![record],
            methods: vec![taxalign_core::matcher::MatchMethod::ScientificName],
        };
        let json: serde_json::Value =
            serde_json::from_str(&render_match(&query, &result, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["method"], "scientificName");
        assert_eq!(json["primary"]["id"], "5");
    }

    #[test]
    fn test_alignment_table_lists_every_rank() {
        let a = RankLadder::new("A", [("kingdom", "Animalia"), ("genus", "Mobula")]);
        let b = RankLadder::new("B", [("genus", "Manta")]);
        let rendered = alignment_table(&align(&[a, b])).to_string();
        assert!(rendered.contains("kingdom"));
        assert!(rendered.contains("Manta"));
        assert!(rendered.contains("mismatch"));
    }
}
