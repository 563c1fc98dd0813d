//! Per-source rank → name ladders

use crate::rank;
use crate::record::{non_blank, TaxonRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankLadderNode {
    /// Trimmed rank text, original case
    pub rank: String,
    pub name: String,
}

/// Ordered rank → name mapping for one source
///
/// Ranks are unique by [`rank::key`]. The first pair for a rank wins; later
/// pairs for the same rank are dropped, as are pairs with a blank rank or name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankLadder {
    label: String,
    nodes: Vec<RankLadderNode>,
}

impl RankLadder {
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            nodes: Vec::new(),
        }
    }

    /// Build from `(rank, name)` pairs in the order given
    pub fn new<I, R, N>(label: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (R, N)>,
        R: AsRef<str>,
        N: AsRef<str>,
    {
        let mut ladder = Self::empty(label);
        for (rank, name) in pairs {
            ladder.push(rank.as_ref(), name.as_ref());
        }
        ladder
    }

    /// Append a pair; returns false when it was discarded
    pub fn push(&mut self, rank: &str, name: &str) -> bool {
        let (Some(rank), Some(name)) = (non_blank(Some(rank)), non_blank(Some(name))) else {
            return false;
        };
        let key = rank::key(rank);
        if self.nodes.iter().any(|n| rank::key(&n.rank) == key) {
            return false;
        }
        self.nodes.push(RankLadderNode {
            rank: rank::normalize(rank),
            name: name.to_string(),
        });
        true
    }

    /// Ladder from the flat classification fields of one record
    ///
    /// Higher ranks come first, then the species binomial and the infra-rank
    /// trinomial composed from genus and epithets, then the record's own rank.
    pub fn from_classification(label: impl Into<String>, record: &TaxonRecord) -> Self {
        let c = &record.classification;
        let mut ladder = Self::empty(label);

        let higher = [
            ("kingdom", &c.kingdom),
            ("phylum", &c.phylum),
            ("class", &c.class),
            ("order", &c.order),
            ("family", &c.family),
            ("genus", &c.genus),
            ("subgenus", &c.subgenus),
        ];
        for (rank, name) in higher {
            if let Some(name) = name {
                ladder.push(rank, name);
            }
        }

        let genus = non_blank(c.genus.as_deref());
        let epithet = non_blank(c.specific_epithet.as_deref());
        if let (Some(genus), Some(epithet)) = (genus, epithet) {
            let species = format!("{genus} {epithet}");
            ladder.push("species", &species);

            if let Some(infra) = non_blank(c.infraspecific_epithet.as_deref()) {
                let infra_rank = record
                    .rank
                    .as_deref()
                    .filter(|r| rank::is_infra_rank(r))
                    .unwrap_or("subspecies");
                ladder.push(infra_rank, &format!("{species} {infra}"));
            }
        }

        if let Some(own_rank) = record.rank.as_deref() {
            ladder.push(own_rank, &record.scientific_name);
        }
        ladder
    }

    /// Ladder from a root-first parent chain
    pub fn from_lineage(label: impl Into<String>, chain: &[TaxonRecord]) -> Self {
        Self::new(
            label,
            chain
                .iter()
                .filter_map(|r| r.rank.as_deref().map(|rank| (rank, r.scientific_name.as_str()))),
        )
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn nodes(&self) -> &[RankLadderNode] {
        &self.nodes
    }

    /// Case-insensitive lookup by rank
    pub fn get_value(&self, rank: &str) -> Option<&str> {
        let key = rank::key(rank);
        self.nodes
            .iter()
            .find(|n| rank::key(&n.rank) == key)
            .map(|n| n.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
