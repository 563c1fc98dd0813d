//! Schema-adaptive, memoizing access to one reference table
//!
//! A [`TaxonStore`] probes its table's columns once, resolves them through a
//! [`SchemaProfile`] and afterwards only issues typed [`Selection`]s. Every
//! lookup is memoized per instance:
//!
//! | Cache          | Key                                   | Value                 |
//! |----------------|---------------------------------------|-----------------------|
//! | by name        | trimmed name, case preserved          | `Vec<TaxonRecord>`    |
//! | by components  | lower-cased genus, species, infra     | `Vec<TaxonRecord>`    |
//! | by id          | trimmed id                            | `Option<TaxonRecord>` |
//! | lineage        | id of the chain's last record         | root-first chain      |
//!
//! Every row fetched by any lookup is also indexed by its own id, so
//! [`TaxonStore::get_by_id`] rarely needs a query of its own.

mod cache;
mod schema;

pub use cache::{CacheCounters, CacheStats, ComponentKey, IdKey, LineageEntry, Lookup, MemoCache, NameKey};
pub use schema::{ColumnAccessor, ColumnMap, SchemaProfile};

use crate::error::{ensure_active, EngineError, Result};
use crate::record::{non_blank, TaxonField, TaxonRecord};
use crate::source::{Predicate, Selection, SourceRow, TaxonSource};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// One page of [`TaxonStore::scan_page`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    pub records: Vec<TaxonRecord>,
    /// Rows read from the source, including skipped ones
    pub rows: usize,
}

/// Lookups over one reference table
///
/// Not `Sync`-safe for concurrent mutation: drive it through `&mut self` from
/// one worker, or wrap it in a `Mutex`.
pub struct TaxonStore<S: TaxonSource> {
    source: S,
    table: String,
    columns: ColumnMap,
    by_name: MemoCache<NameKey, Vec<TaxonRecord>>,
    by_components: MemoCache<ComponentKey, Vec<TaxonRecord>>,
    by_id: MemoCache<IdKey, Option<TaxonRecord>>,
    lineage: MemoCache<IdKey, LineageEntry>,
    cancel: CancellationToken,
}

impl<S: TaxonSource> TaxonStore<S> {
    /// Open `table` with the default [`SchemaProfile`]
    pub fn open(source: S, table: &str) -> Result<Self> {
        Self::with_profile(source, table, &SchemaProfile::default())
    }

    /// Open `table`, resolving columns through `profile`
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownTable`] when the table has no columns, or the
    /// source's own error when the metadata probe fails.
    pub fn with_profile(source: S, table: &str, profile: &SchemaProfile) -> Result<Self> {
        let actual = source.column_names(table)?;
        if actual.is_empty() {
            return Err(EngineError::UnknownTable(table.to_string()));
        }

        let columns = profile.resolve(&actual);
        for (field, column) in columns.mapped() {
            debug!(table, field = %field, column, "Mapped column");
        }
        for field in columns.unmapped() {
            debug!(table, field = %field, "No matching column, field reads as NULL");
        }
        if !columns.is_mapped(TaxonField::Id) || !columns.is_mapped(TaxonField::ScientificName) {
            warn!(table, "Table has no id or scientific name column; every lookup will be empty");
        }

        Ok(Self {
            source,
            table: table.to_string(),
            columns,
            by_name: MemoCache::new(),
            by_components: MemoCache::new(),
            by_id: MemoCache::new(),
            lineage: MemoCache::new(),
            cancel: CancellationToken::new(),
        })
    }

    /// Poll `token` in every lookup and traversal step
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn set_cancellation(&mut self, token: CancellationToken) {
        self.cancel = token;
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column_map(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            by_name: self.by_name.stats(),
            by_components: self.by_components.stats(),
            by_id: self.by_id.stats(),
            lineage: self.lineage.stats(),
        }
    }

    /// Case-insensitive exact match on the scientific name
    ///
    /// Blank input returns an empty list without querying.
    pub fn find_by_scientific_name(&mut self, name: &str) -> Result<Vec<TaxonRecord>> {
        ensure_active(&self.cancel)?;
        let Some(name) = non_blank(Some(name)) else {
            return Ok(Vec::new());
        };

        let key = NameKey::new(name);
        if let Lookup::Cached(records) = self.by_name.get(&key) {
            return Ok(records);
        }
        if !self.is_queryable() {
            return Ok(Vec::new());
        }
        let Some(column) = self.column_of(TaxonField::ScientificName) else {
            return Ok(Vec::new());
        };

        let records = self.fetch(&[Predicate::equals_ignore_case(column, name)], None)?;
        debug!(table = %self.table, name, found = records.len(), "Looked up scientific name");
        self.by_name.insert(key, records.clone());
        Ok(records)
    }

    /// Case-insensitive exact match on genus + species (+ infra epithet)
    ///
    /// Without an infra epithet only rows whose infra-epithet column is NULL or
    /// blank match. Blank genus or species returns an empty list.
    pub fn find_by_components(
        &mut self,
        genus: &str,
        species: &str,
        infra_epithet: Option<&str>,
    ) -> Result<Vec<TaxonRecord>> {
        ensure_active(&self.cancel)?;
        let (Some(genus), Some(species)) = (non_blank(Some(genus)), non_blank(Some(species))) else {
            return Ok(Vec::new());
        };
        let infra_epithet = non_blank(infra_epithet);

        let key = ComponentKey::new(genus, species, infra_epithet);
        if let Lookup::Cached(records) = self.by_components.get(&key) {
            return Ok(records);
        }
        if !self.is_queryable() {
            return Ok(Vec::new());
        }

        let Some(predicates) = self.component_predicates(genus, species, infra_epithet) else {
            debug!(table = %self.table, genus, species, "Component columns absent, nothing can match");
            self.by_components.insert(key, Vec::new());
            return Ok(Vec::new());
        };

        let records = self.fetch(&predicates, None)?;
        debug!(
            table = %self.table,
            genus,
            species,
            infra = infra_epithet.unwrap_or(""),
            found = records.len(),
            "Looked up name components"
        );
        self.by_components.insert(key, records.clone());
        Ok(records)
    }

    /// `None` when any required column is absent
    fn component_predicates(
        &self,
        genus: &str,
        species: &str,
        infra_epithet: Option<&str>,
    ) -> Option<Vec<Predicate>> {
        let mut predicates = vec![
            Predicate::equals_ignore_case(self.column_of(TaxonField::Genus)?, genus),
            Predicate::equals_ignore_case(self.column_of(TaxonField::SpecificEpithet)?, species),
        ];

        let infra_column = self.column_of(TaxonField::InfraspecificEpithet);
        match (infra_epithet, infra_column) {
            (Some(infra), Some(column)) => predicates.push(Predicate::equals_ignore_case(column, infra)),
            (Some(_), None) => return None,
            (None, Some(column)) => predicates.push(Predicate::null_or_blank(column)),
            // an absent column is always NULL
            (None, None) => {},
        }
        Some(predicates)
    }

    /// Single record by identifier; misses are cached too
    pub fn get_by_id(&mut self, id: &str) -> Result<Option<TaxonRecord>> {
        ensure_active(&self.cancel)?;
        let Some(id) = non_blank(Some(id)) else {
            return Ok(None);
        };

        let key = IdKey::new(id);
        if let Lookup::Cached(record) = self.by_id.get(&key) {
            return Ok(record);
        }
        if !self.is_queryable() {
            return Ok(None);
        }
        let Some(column) = self.column_of(TaxonField::Id) else {
            return Ok(None);
        };

        let record = self
            .fetch(&[Predicate::equals(column, id)], Some(1))?
            .into_iter()
            .next();
        if record.is_none() {
            trace!(table = %self.table, id, "Identifier not found");
        }
        self.by_id.insert(key, record.clone());
        Ok(record)
    }

    /// Root-first lineage of `record`, ending with `record` itself
    ///
    /// Follows parent ids until a record has none, a parent cannot be
    /// resolved, or an id repeats. A cycle ends the walk with what was gathered
    /// so far. Chains that ended naturally are cached for every ancestor, so
    /// siblings and descendants reuse them.
    pub fn get_parent_chain(&mut self, record: &TaxonRecord) -> Result<Vec<TaxonRecord>> {
        ensure_active(&self.cancel)?;
        let start = IdKey::new(&record.id);
        if let Lookup::Cached(entry) = self.lineage.get(&start) {
            return Ok(entry.chain);
        }

        // leaf-first while walking
        let mut path = vec![record.clone()];
        let mut visited: HashSet<String> = HashSet::from([start.as_str().to_string()]);
        let mut ancestors: Vec<TaxonRecord> = Vec::new();
        let mut cyclic = false;

        loop {
            ensure_active(&self.cancel)?;
            let current = path.last().unwrap_or(record);
            let Some(parent_id) = non_blank(current.parent_id.as_deref()).map(str::to_string) else {
                break;
            };

            if visited.contains(&parent_id) {
                warn!(table = %self.table, id = %record.id, %parent_id, "Parent cycle, stopping lineage walk");
                cyclic = true;
                break;
            }

            let reusable = self
                .lineage
                .peek(&IdKey::new(&parent_id))
                .filter(|cached| !cached.chain.iter().any(|r| visited.contains(&r.id)))
                .cloned();
            if let Some(cached) = reusable {
                trace!(table = %self.table, %parent_id, depth = cached.chain.len(), "Reusing cached lineage");
                // a chain built on a cyclic walk is cyclic too
                cyclic = cached.cyclic;
                ancestors = cached.chain;
                break;
            }

            match self.get_by_id(&parent_id)? {
                Some(parent) => {
                    visited.insert(parent.id.clone());
                    path.push(parent);
                },
                None => {
                    debug!(table = %self.table, id = %current.id, %parent_id, "Parent not found, lineage ends here");
                    break;
                },
            }
        }

        path.reverse();
        let mut chain = ancestors;
        chain.extend(path);

        if cyclic {
            // prefixes of a cyclic walk depend on where it started
            self.lineage.insert(
                start,
                LineageEntry {
                    chain: chain.clone(),
                    cyclic,
                },
            );
        } else {
            for end in 0..chain.len() {
                let key = IdKey::new(&chain[end].id);
                self.lineage.insert_if_absent(
                    key,
                    LineageEntry {
                        chain: chain[..=end].to_vec(),
                        cyclic,
                    },
                );
            }
        }
        Ok(chain)
    }

    /// Every valid record of the table, in natural order, up to `limit`
    pub fn scan(&mut self, limit: Option<usize>) -> Result<Vec<TaxonRecord>> {
        ensure_active(&self.cancel)?;
        if !self.is_queryable() {
            return Ok(Vec::new());
        }
        let records = self.fetch(&[], limit)?;
        debug!(table = %self.table, rows = records.len(), "Scanned table");
        Ok(records)
    }

    /// Up to `size` rows starting `offset` rows into the table
    ///
    /// `rows` counts invalid rows too, so the next page starts at
    /// `offset + rows` and a short page means the table is exhausted.
    pub fn scan_page(&mut self, offset: usize, size: usize) -> Result<ScanPage> {
        ensure_active(&self.cancel)?;
        if !self.is_queryable() || size == 0 {
            return Ok(ScanPage::default());
        }
        let rows = self.fetch_rows(&[], Some(size), offset)?;
        let read = rows.len();
        let records = self.materialize(rows)?;
        trace!(table = %self.table, offset, rows = read, records = records.len(), "Scanned page");
        Ok(ScanPage { records, rows: read })
    }

    fn is_queryable(&self) -> bool {
        self.columns.is_mapped(TaxonField::Id) && self.columns.is_mapped(TaxonField::ScientificName)
    }

    fn column_of(&self, field: TaxonField) -> Option<String> {
        self.columns.column(field).map(str::to_string)
    }

    fn fetch(&mut self, predicates: &[Predicate], limit: Option<usize>) -> Result<Vec<TaxonRecord>> {
        let rows = self.fetch_rows(predicates, limit, 0)?;
        self.materialize(rows)
    }

    fn fetch_rows(&self, predicates: &[Predicate], limit: Option<usize>, offset: usize) -> Result<Vec<SourceRow>> {
        let selection = Selection {
            table: &self.table,
            columns: self.columns.projection(),
            predicates,
            limit,
            offset,
        };
        self.source.select(&selection)
    }

    fn materialize(&mut self, rows: Vec<SourceRow>) -> Result<Vec<TaxonRecord>> {
        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;

        for row in rows {
            ensure_active(&self.cancel)?;
            match self.columns.materialize(&row) {
                Some(record) => {
                    self.by_id
                        .insert_if_absent(IdKey::new(&record.id), Some(record.clone()));
                    records.push(record);
                },
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(table = %self.table, skipped, "Skipped rows with blank id or scientific name");
        }
        Ok(records)
    }
}
