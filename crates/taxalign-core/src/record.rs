//! Taxon records and lookup queries

use crate::rank;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical fields a reference table may expose
///
/// Each source names these columns differently; see [`crate::store::SchemaProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonField {
    Id,
    ScientificName,
    Authorship,
    Status,
    Rank,
    AcceptedId,
    ParentId,
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Subgenus,
    SpecificEpithet,
    InfraspecificEpithet,
}

impl TaxonField {
    pub const COUNT: usize = 16;

    pub const ALL: [TaxonField; Self::COUNT] = [
        TaxonField::Id,
        TaxonField::ScientificName,
        TaxonField::Authorship,
        TaxonField::Status,
        TaxonField::Rank,
        TaxonField::AcceptedId,
        TaxonField::ParentId,
        TaxonField::Kingdom,
        TaxonField::Phylum,
        TaxonField::Class,
        TaxonField::Order,
        TaxonField::Family,
        TaxonField::Genus,
        TaxonField::Subgenus,
        TaxonField::SpecificEpithet,
        TaxonField::InfraspecificEpithet,
    ];

    /// Slot of this field in [`TaxonField::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaxonField::Id => "id",
            TaxonField::ScientificName => "scientific_name",
            TaxonField::Authorship => "authorship",
            TaxonField::Status => "status",
            TaxonField::Rank => "rank",
            TaxonField::AcceptedId => "accepted_id",
            TaxonField::ParentId => "parent_id",
            TaxonField::Kingdom => "kingdom",
            TaxonField::Phylum => "phylum",
            TaxonField::Class => "class",
            TaxonField::Order => "order",
            TaxonField::Family => "family",
            TaxonField::Genus => "genus",
            TaxonField::Subgenus => "subgenus",
            TaxonField::SpecificEpithet => "specific_epithet",
            TaxonField::InfraspecificEpithet => "infraspecific_epithet",
        }
    }
}

impl fmt::Display for TaxonField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxonField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        TaxonField::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| format!("unknown taxon field '{}'", s))
    }
}

/// Higher-rank names carried flat on a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub kingdom: Option<String>,
    pub phylum: Option<String>,
    pub class: Option<String>,
    pub order: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub subgenus: Option<String>,
    pub specific_epithet: Option<String>,
    pub infraspecific_epithet: Option<String>,
}

/// One valid row of a reference table
///
/// `id` and `scientific_name` are never blank; the store drops rows where
/// either is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonRecord {
    pub id: String,
    pub scientific_name: String,
    pub authorship: Option<String>,
    /// Free text; "accepted"/"synonym" are detected by substring
    pub status: Option<String>,
    pub rank: Option<String>,
    /// Set on synonyms, points at the accepted record's id
    pub accepted_id: Option<String>,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub classification: Classification,
}

impl TaxonRecord {
    /// Create a record with only the mandatory fields
    pub fn new(id: impl Into<String>, scientific_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scientific_name: scientific_name.into(),
            authorship: None,
            status: None,
            rank: None,
            accepted_id: None,
            parent_id: None,
            classification: Classification::default(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_rank(mut self, rank: impl Into<String>) -> Self {
        self.rank = Some(rank.into());
        self
    }

    pub fn with_authorship(mut self, authorship: impl Into<String>) -> Self {
        self.authorship = Some(authorship.into());
        self
    }

    pub fn with_accepted_id(mut self, id: impl Into<String>) -> Self {
        self.accepted_id = Some(id.into());
        self
    }

    pub fn with_parent_id(mut self, id: impl Into<String>) -> Self {
        self.parent_id = Some(id.into());
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    pub fn is_accepted(&self) -> bool {
        status_contains(self.status.as_deref(), "accepted")
    }

    pub fn is_synonym(&self) -> bool {
        status_contains(self.status.as_deref(), "synonym")
    }

    /// True when the rank label names a subspecies, variety or form
    pub fn has_infra_rank(&self) -> bool {
        self.rank.as_deref().is_some_and(rank::is_infra_rank)
    }

    /// Non-blank accepted-name pointer, if any
    pub fn accepted_pointer(&self) -> Option<&str> {
        non_blank(self.accepted_id.as_deref())
    }
}

fn status_contains(status: Option<&str>, needle: &str) -> bool {
    status.is_some_and(|s| s.to_lowercase().contains(needle))
}

/// Trimmed view of `value`, or `None` when blank
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn owned_non_blank(value: Option<&str>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

/// Connecting terms that separate epithets in a trinomial
const CONNECTING_TERMS: [&str; 7] = ["subsp.", "ssp.", "var.", "f.", "forma", "subvar.", "morph"];

/// The organism being looked up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTaxon {
    pub scientific_name: Option<String>,
    pub genus: Option<String>,
    pub species: Option<String>,
    pub infra_epithet: Option<String>,
    /// Explicit infra-rank expectation; derived when `None`
    pub infra_rank: Option<bool>,
}

impl QueryTaxon {
    pub fn from_name(name: impl AsRef<str>) -> Self {
        Self {
            scientific_name: owned_non_blank(Some(name.as_ref())),
            ..Self::default()
        }
    }

    pub fn from_components(genus: &str, species: &str, infra_epithet: Option<&str>) -> Self {
        Self {
            genus: owned_non_blank(Some(genus)),
            species: owned_non_blank(Some(species)),
            infra_epithet: owned_non_blank(infra_epithet),
            ..Self::default()
        }
    }

    /// Build a query from a record of the other dataset
    pub fn from_record(record: &TaxonRecord) -> Self {
        let c = &record.classification;
        Self {
            scientific_name: owned_non_blank(Some(&record.scientific_name)),
            genus: owned_non_blank(c.genus.as_deref()),
            species: owned_non_blank(c.specific_epithet.as_deref()),
            infra_epithet: owned_non_blank(c.infraspecific_epithet.as_deref()),
            infra_rank: non_blank(record.rank.as_deref()).map(rank::is_infra_rank),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.scientific_name = owned_non_blank(Some(name));
        self
    }

    pub fn with_infra_rank(mut self, expected: bool) -> Self {
        self.infra_rank = Some(expected);
        self
    }

    /// Whether the lookup should prefer subspecies/variety/form candidates
    ///
    /// Uses the explicit flag when set. Otherwise an infra-epithet component, or
    /// a name with two or more epithets (`Panthera leo persica`,
    /// `Rosa canina var. lutetiana`), implies an infra-rank.
    pub fn expects_infra_rank(&self) -> bool {
        if let Some(expected) = self.infra_rank {
            return expected;
        }
        if self.infra_epithet.is_some() {
            return true;
        }
        self.scientific_name
            .as_deref()
            .is_some_and(|name| epithet_count(name) >= 2)
    }

    pub fn has_components(&self) -> bool {
        self.genus.is_some() && self.species.is_some()
    }

    /// Human-readable form for logs and reports
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.scientific_name {
            return name.clone();
        }
        [&self.genus, &self.species, &self.infra_epithet]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Lower-case epithet tokens after the genus, ignoring connecting terms and
/// trailing authorship.
fn epithet_count(name: &str) -> usize {
    name.split_whitespace()
        .skip(1)
        .filter(|token| !CONNECTING_TERMS.contains(&token.to_lowercase().as_str()))
        .take_while(|token| token.chars().next().is_some_and(char::is_lowercase))
        .count()
}
