//! Rank-by-rank merge of several ladders
//!
//! [`align`] builds one row per distinct rank across all inputs, in canonical
//! rank order (unknown ranks last, ties by key). A source without a value at a
//! rank is simply absent from that row's map.

use crate::ladder::RankLadder;
use crate::rank;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How the sources compare at one rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agreement {
    /// Every source has the rank with the same name
    Agree,
    /// At least two sources name the rank differently
    Disagree,
    /// Some sources lack the rank; the rest agree
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentRow {
    /// Lower-cased rank key
    pub rank: String,
    /// Source label → name at this rank
    pub values: BTreeMap<String, String>,
}

impl AlignmentRow {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.values.get(label).map(String::as_str)
    }

    /// Compare the names across `labels`; names match case-insensitively
    pub fn agreement(&self, labels: &[String]) -> Agreement {
        let present: Vec<String> = labels
            .iter()
            .filter_map(|label| self.values.get(label))
            .map(|name| name.to_lowercase())
            .collect();

        if present.windows(2).any(|pair| pair[0] != pair[1]) {
            Agreement::Disagree
        } else if present.len() < labels.len() {
            Agreement::Partial
        } else {
            Agreement::Agree
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentResult {
    labels: Vec<String>,
    rows: Vec<AlignmentRow>,
}

impl AlignmentResult {
    /// Source labels, in the order the ladders were supplied
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn rows(&self) -> &[AlignmentRow] {
        &self.rows
    }

    pub fn row(&self, rank: &str) -> Option<&AlignmentRow> {
        let key = rank::key(rank);
        self.rows.iter().find(|r| r.rank == key)
    }

    pub fn agreement(&self, row: &AlignmentRow) -> Agreement {
        row.agreement(&self.labels)
    }

    /// Rows where two sources name the same rank differently
    pub fn mismatches(&self) -> Vec<&AlignmentRow> {
        self.rows
            .iter()
            .filter(|row| self.agreement(row) == Agreement::Disagree)
            .collect()
    }

    /// Rows that `label` has no value for
    pub fn missing_from(&self, label: &str) -> Vec<&AlignmentRow> {
        self.rows
            .iter()
            .filter(|row| !row.values.contains_key(label))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Merge ladders into one table
///
/// Ladders sharing a label are merged; the earlier ladder wins a rank both
/// carry.
pub fn align(ladders: &[RankLadder]) -> AlignmentResult {
    let mut labels: Vec<String> = Vec::new();
    let mut merged: HashMap<String, BTreeMap<String, String>> = HashMap::new();

    for ladder in ladders {
        if !labels.iter().any(|l| l == ladder.label()) {
            labels.push(ladder.label().to_string());
        }
        for node in ladder.nodes() {
            merged
                .entry(rank::key(&node.rank))
                .or_default()
                .entry(ladder.label().to_string())
                .or_insert_with(|| node.name.clone());
        }
    }

    let mut rows: Vec<AlignmentRow> = merged
        .into_iter()
        .map(|(rank, values)| AlignmentRow { rank, values })
        .collect();
    rows.sort_by(|a, b| rank::compare(&a.rank, &b.rank));

    AlignmentResult { labels, rows }
}
