//! Schema-adaptive column mapping
//!
//! A [`SchemaProfile`] lists candidate column names per canonical field. At store
//! construction it is resolved once against the table's real columns into a
//! [`ColumnMap`]: every field gets a [`ColumnAccessor`], either a slot in the
//! projection or the constant-null accessor.

use crate::record::{non_blank, Classification, TaxonField, TaxonRecord};
use crate::source::SourceRow;
use serde::Serialize;
use std::collections::BTreeMap;

/// Candidate column names per canonical field, most preferred first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaProfile {
    candidates: BTreeMap<TaxonField, Vec<String>>,
}

impl Default for SchemaProfile {
    /// Darwin Core catalogue exports plus conservation-assessment exports
    fn default() -> Self {
        let defaults: [(TaxonField, &[&str]); TaxonField::COUNT] = [
            (TaxonField::Id, &["taxonID", "taxon_id", "internalTaxonId", "id"]),
            (
                TaxonField::ScientificName,
                &["scientificName", "scientific_name", "canonicalName", "name"],
            ),
            (
                TaxonField::Authorship,
                &["scientificNameAuthorship", "authority", "authorship", "author"],
            ),
            (TaxonField::Status, &["taxonomicStatus", "taxonomic_status", "status"]),
            (TaxonField::Rank, &["taxonRank", "taxon_rank", "rank"]),
            (
                TaxonField::AcceptedId,
                &["acceptedNameUsageID", "accepted_name_usage_id", "acceptedId", "accepted_id"],
            ),
            (
                TaxonField::ParentId,
                &["parentNameUsageID", "parent_name_usage_id", "parentId", "parent_id"],
            ),
            (TaxonField::Kingdom, &["kingdom", "kingdomName"]),
            (TaxonField::Phylum, &["phylum", "phylumName", "division"]),
            (TaxonField::Class, &["class", "className"]),
            (TaxonField::Order, &["order", "orderName"]),
            (TaxonField::Family, &["family", "familyName"]),
            (TaxonField::Genus, &["genus", "genericName", "genusName"]),
            (TaxonField::Subgenus, &["subgenus", "infragenericEpithet"]),
            (
                TaxonField::SpecificEpithet,
                &["specificEpithet", "speciesName", "species", "specific_epithet"],
            ),
            (
                TaxonField::InfraspecificEpithet,
                &["infraspecificEpithet", "infraName", "infraspecific_epithet", "infraEpithet"],
            ),
        ];

        let candidates = defaults
            .into_iter()
            .map(|(field, names)| (field, names.iter().map(|n| n.to_string()).collect()))
            .collect();
        Self { candidates }
    }
}

impl SchemaProfile {
    /// A profile with no candidates at all
    pub fn empty() -> Self {
        Self {
            candidates: BTreeMap::new(),
        }
    }

    /// Put `columns` ahead of the existing candidates for `field`
    pub fn with_candidates<I, S>(mut self, field: TaxonField, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut merged: Vec<String> = columns.into_iter().map(Into::into).collect();
        for existing in self.candidates.remove(&field).unwrap_or_default() {
            if !merged.contains(&existing) {
                merged.push(existing);
            }
        }
        self.candidates.insert(field, merged);
        self
    }

    pub fn candidates(&self, field: TaxonField) -> &[String] {
        self.candidates.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve against the table's actual columns (case-insensitive)
    pub fn resolve(&self, actual: &[String]) -> ColumnMap {
        let mut projection: Vec<String> = Vec::new();
        let mut accessors = [ColumnAccessor::Null; TaxonField::COUNT];

        for field in TaxonField::ALL {
            let found = self.candidates(field).iter().find_map(|candidate| {
                actual
                    .iter()
                    .find(|column| column.eq_ignore_ascii_case(candidate))
            });

            if let Some(column) = found {
                let slot = match projection.iter().position(|c| c == column) {
                    Some(slot) => slot,
                    None => {
                        projection.push(column.clone());
                        projection.len() - 1
                    },
                };
                accessors[field.index()] = ColumnAccessor::Column(slot);
            }
        }

        ColumnMap {
            projection,
            accessors,
        }
    }
}

/// How a canonical field is read from a fetched row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnAccessor {
    /// Index into the projected row
    Column(usize),
    /// The table has no such column; always reads as NULL
    Null,
}

impl ColumnAccessor {
    /// Trimmed, non-blank cell value
    pub fn read(self, row: &SourceRow) -> Option<&str> {
        match self {
            ColumnAccessor::Column(slot) => non_blank(row.get(slot).and_then(|c| c.as_deref())),
            ColumnAccessor::Null => None,
        }
    }
}

/// Resolved mapping for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    projection: Vec<String>,
    accessors: [ColumnAccessor; TaxonField::COUNT],
}

impl ColumnMap {
    /// Actual columns to select, deduplicated
    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    pub fn accessor(&self, field: TaxonField) -> ColumnAccessor {
        self.accessors[field.index()]
    }

    /// Actual column backing `field`, if any
    pub fn column(&self, field: TaxonField) -> Option<&str> {
        match self.accessor(field) {
            ColumnAccessor::Column(slot) => self.projection.get(slot).map(String::as_str),
            ColumnAccessor::Null => None,
        }
    }

    pub fn is_mapped(&self, field: TaxonField) -> bool {
        self.column(field).is_some()
    }

    pub fn unmapped(&self) -> Vec<TaxonField> {
        TaxonField::ALL
            .into_iter()
            .filter(|field| !self.is_mapped(*field))
            .collect()
    }

    /// Field → column pairs for reporting
    pub fn mapped(&self) -> Vec<(TaxonField, &str)> {
        TaxonField::ALL
            .into_iter()
            .filter_map(|field| self.column(field).map(|c| (field, c)))
            .collect()
    }

    fn text(&self, row: &SourceRow, field: TaxonField) -> Option<String> {
        self.accessor(field).read(row).map(str::to_string)
    }

    /// Build a record from a fetched row; `None` when id or name is blank
    pub fn materialize(&self, row: &SourceRow) -> Option<TaxonRecord> {
        let id = self.text(row, TaxonField::Id)?;
        let scientific_name = self.text(row, TaxonField::ScientificName)?;

        Some(TaxonRecord {
            id,
            scientific_name,
            authorship: self.text(row, TaxonField::Authorship),
            status: self.text(row, TaxonField::Status),
            rank: self.text(row, TaxonField::Rank),
            accepted_id: self.text(row, TaxonField::AcceptedId),
            parent_id: self.text(row, TaxonField::ParentId),
            classification: Classification {
                kingdom: self.text(row, TaxonField::Kingdom),
                phylum: self.text(row, TaxonField::Phylum),
                class: self.text(row, TaxonField::Class),
                order: self.text(row, TaxonField::Order),
                family: self.text(row, TaxonField::Family),
                genus: self.text(row, TaxonField::Genus),
                subgenus: self.text(row, TaxonField::Subgenus),
                specific_epithet: self.text(row, TaxonField::SpecificEpithet),
                infraspecific_epithet: self.text(row, TaxonField::InfraspecificEpithet),
            },
        })
    }
}
