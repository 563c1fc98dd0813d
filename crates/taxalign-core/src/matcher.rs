//! Candidate retrieval and primary-match selection
//!
//! [`MatchResolver::resolve`] runs the lookup pipeline against one store:
//!
//! 1. candidates by full scientific name, then by name components when the
//!    name found nothing
//! 2. de-duplication by identifier, first occurrence wins
//! 3. primary selection over [`CandidateGroup`]s in a fixed order, preferring a
//!    candidate whose rank fits the query's infra-rank expectation
//! 4. accepted-name redirect through the store's identifier lookup
//!
//! Within a group the first fitting candidate in store order wins. That
//! tie-break is deterministic but carries no taxonomic meaning.

use crate::error::Result;
use crate::record::{QueryTaxon, TaxonRecord};
use crate::source::TaxonSource;
use crate::store::TaxonStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// How a candidate list was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchMethod {
    #[serde(rename = "scientificName")]
    ScientificName,
    #[serde(rename = "components")]
    Components,
}

impl MatchMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScientificName => "scientificName",
            Self::Components => "components",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolver output for one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub primary: Option<TaxonRecord>,
    /// Same as `primary` unless it redirected; `None` when the redirect target
    /// does not exist
    pub accepted: Option<TaxonRecord>,
    /// De-duplicated, in store order
    pub candidates: Vec<TaxonRecord>,
    pub methods: Vec<MatchMethod>,
}

impl MatchResult {
    /// Methods that produced candidates, comma-joined, or `"none"`
    pub fn method_label(&self) -> String {
        if self.methods.is_empty() {
            return "none".to_string();
        }
        self.methods
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn is_found(&self) -> bool {
        self.primary.is_some()
    }

    /// Primary pointed at a different, resolvable accepted record
    pub fn is_synonym_redirect(&self) -> bool {
        match (&self.primary, &self.accepted) {
            (Some(primary), Some(accepted)) => primary.id != accepted.id,
            _ => false,
        }
    }

    /// The record downstream comparisons should use
    pub fn target(&self) -> Option<&TaxonRecord> {
        self.accepted.as_ref().or(self.primary.as_ref())
    }
}

/// Status bucket used by the tie-break table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateGroup {
    Accepted,
    Synonym,
    Other,
}

impl CandidateGroup {
    pub fn of(record: &TaxonRecord) -> Self {
        if record.is_accepted() {
            Self::Accepted
        } else if record.is_synonym() {
            Self::Synonym
        } else {
            Self::Other
        }
    }
}

/// Whether to stop at the first lookup that found something
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Components are only tried when the name found nothing
    #[default]
    FirstHit,
    /// Always run both lookups and merge their candidates
    Exhaustive,
}

/// Table-driven primary selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResolver {
    group_order: Vec<CandidateGroup>,
    search: SearchMode,
}

impl Default for MatchResolver {
    fn default() -> Self {
        Self {
            group_order: vec![CandidateGroup::Accepted, CandidateGroup::Synonym],
            search: SearchMode::FirstHit,
        }
    }
}

impl MatchResolver {
    /// Groups to try, in order, before falling back to all candidates
    pub fn with_group_order(mut self, order: Vec<CandidateGroup>) -> Self {
        self.group_order = order;
        self
    }

    pub fn with_search_mode(mut self, search: SearchMode) -> Self {
        self.search = search;
        self
    }

    pub fn group_order(&self) -> &[CandidateGroup] {
        &self.group_order
    }

    /// Resolve `query` against `store`
    ///
    /// An empty result is not an error; only data-access failures and
    /// cancellation are.
    pub fn resolve<S: TaxonSource>(
        &self,
        store: &mut TaxonStore<S>,
        query: &QueryTaxon,
    ) -> Result<MatchResult> {
        let mut candidates = Vec::new();
        let mut methods = Vec::new();

        if let Some(name) = query.scientific_name.as_deref() {
            let found = store.find_by_scientific_name(name)?;
            if !found.is_empty() {
                methods.push(MatchMethod::ScientificName);
                candidates.extend(found);
            }
        }

        if candidates.is_empty() || self.search == SearchMode::Exhaustive {
            if let (Some(genus), Some(species)) = (query.genus.as_deref(), query.species.as_deref()) {
                let found = store.find_by_components(genus, species, query.infra_epithet.as_deref())?;
                if !found.is_empty() {
                    methods.push(MatchMethod::Components);
                    candidates.extend(found);
                }
            }
        }

        let candidates = dedup_by_id(candidates);
        let Some(primary) = self
            .select_primary(&candidates, query.expects_infra_rank())
            .cloned()
        else {
            debug!(query = %query.display_name(), "No candidates");
            return Ok(MatchResult {
                methods,
                ..MatchResult::default()
            });
        };

        let accepted = match primary.accepted_pointer() {
            None => Some(primary.clone()),
            Some(id) if id == primary.id => Some(primary.clone()),
            Some(id) => {
                let accepted = store.get_by_id(id)?;
                if accepted.is_none() {
                    debug!(
                        table = store.table(),
                        primary = %primary.id,
                        accepted_id = id,
                        "Accepted-name pointer does not resolve"
                    );
                }
                accepted
            },
        };

        let result = MatchResult {
            primary: Some(primary),
            accepted,
            candidates,
            methods,
        };
        debug!(
            query = %query.display_name(),
            method = %result.method_label(),
            candidates = result.candidates.len(),
            redirect = result.is_synonym_redirect(),
            "Resolved match"
        );
        Ok(result)
    }

    /// Pick the primary among de-duplicated candidates
    ///
    /// Each configured group is tried in turn for a candidate whose rank fits;
    /// failing that, any fitting candidate; failing that, the first one.
    pub fn select_primary<'a>(
        &self,
        candidates: &'a [TaxonRecord],
        expects_infra_rank: bool,
    ) -> Option<&'a TaxonRecord> {
        self.group_order
            .iter()
            .find_map(|group| {
                candidates
                    .iter()
                    .filter(|c| CandidateGroup::of(c) == *group)
                    .find(|c| rank_fits(c, expects_infra_rank))
            })
            .or_else(|| candidates.iter().find(|c| rank_fits(c, expects_infra_rank)))
            .or_else(|| candidates.first())
    }
}

/// Infra-rank candidates fit infra queries; everything else fits the rest
pub fn rank_fits(candidate: &TaxonRecord, expects_infra_rank: bool) -> bool {
    candidate.has_infra_rank() == expects_infra_rank
}

/// Keep the first record per identifier, preserving order
pub fn dedup_by_id(candidates: Vec<TaxonRecord>) -> Vec<TaxonRecord> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rusqlite::Connection;

    fn record(id: &str, status: &str, rank: &str) -> TaxonRecord {
        TaxonRecord::new(id, format!("Taxon {id}"))
            .with_status(status)
            .with_rank(rank)
    }

    #[test]
    fn test_accepted_infra_preferred_over_synonym_species() {
        let candidates = vec![record("s", "synonym", "species"), record("a", "accepted", "subspecies")];
        let primary = MatchResolver::default().select_primary(&candidates, true).unwrap();
        assert_eq!(primary.id, "a");
    }

    #[test]
    fn test_falls_through_to_synonym_group_on_rank() {
        let candidates = vec![record("a", "accepted", "species"), record("s", "synonym", "subspecies")];
        let primary = MatchResolver::default().select_primary(&candidates, true).unwrap();
        assert_eq!(primary.id, "s");
    }

    #[test]
    fn test_falls_back_to_any_fitting_then_first() {
        let candidates = vec![record("a", "accepted", "subspecies"), record("d", "doubtful", "species")];
        let primary = MatchResolver::default().select_primary(&candidates, false).unwrap();
        assert_eq!(primary.id, "d");

        let candidates = vec![record("x", "accepted", "species"), record("y", "synonym", "species")];
        let primary = MatchResolver::default().select_primary(&candidates, true).unwrap();
        assert_eq!(primary.id, "x");
    }

    #[test]
    fn test_first_fitting_candidate_wins_within_group() {
        let candidates = vec![record("a1", "Accepted", "Species"), record("a2", "accepted", "species")];
        let resolver = MatchResolver::default();
        assert_eq!(resolver.select_primary(&candidates, false).unwrap().id, "a1");
        assert_eq!(resolver.select_primary(&candidates, false).unwrap().id, "a1");
    }

    #[test]
    fn test_custom_group_order() {
        let candidates = vec![record("a", "accepted", "species"), record("s", "synonym", "species")];
        let resolver = MatchResolver::default().with_group_order(vec![CandidateGroup::Synonym]);
        assert_eq!(resolver.select_primary(&candidates, false).unwrap().id, "s");
    }

    #[test]
    fn test_empty_candidates() {
        assert!(MatchResolver::default().select_primary(&[], false).is_none());
    }

    #[test]
    fn test_dedup_keeps_first() {
        let deduped = dedup_by_id(vec![
            record("1", "accepted", "species"),
            record("2", "synonym", "species"),
            record("1", "synonym", "species"),
        ]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].status.as_deref(), Some("accepted"));
    }

    #[test]
    fn test_method_label() {
        let mut result = MatchResult::default();
        assert_eq!(result.method_label(), "none");
        result.methods = vec![MatchMethod::ScientificName, MatchMethod::Components];
        assert_eq!(result.method_label(), "scientificName,components");
    }

    fn store_fixture() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE taxon (taxonID TEXT, scientificName TEXT, taxonomicStatus TEXT,
                taxonRank TEXT, acceptedNameUsageID TEXT, genus TEXT, specificEpithet TEXT,
                infraspecificEpithet TEXT);
             INSERT INTO taxon VALUES
                ('4', 'Mobula alfredi', 'accepted', 'species', NULL, 'Mobula', 'alfredi', NULL),
                ('5', 'Manta alfredi', 'synonym', 'species', '4', 'Manta', 'alfredi', NULL),
                ('6', 'Manta birostris', 'synonym', 'species', '999', 'Manta', 'birostris', NULL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_resolve_redirects_synonym() {
        let conn = store_fixture();
        let mut store = TaxonStore::open(&conn, "taxon").unwrap();
        let result = MatchResolver::default()
            .resolve(&mut store, &QueryTaxon::from_name("Manta alfredi"))
            .unwrap();

        assert_eq!(result.primary.as_ref().unwrap().id, "5");
        assert_eq!(result.accepted.as_ref().unwrap().id, "4");
        assert!(result.is_synonym_redirect());
        assert_eq!(result.method_label(), "scientificName");
    }

    #[test]
    fn test_resolve_unresolved_pointer_leaves_primary() {
        let conn = store_fixture();
        let mut store = TaxonStore::open(&conn, "taxon").unwrap();
        let result = MatchResolver::default()
            .resolve(&mut store, &QueryTaxon::from_name("Manta birostris"))
            .unwrap();

        assert_eq!(result.primary.as_ref().unwrap().id, "6");
        assert!(result.accepted.is_none());
        assert!(!result.is_synonym_redirect());
    }

    #[test]
    fn test_resolve_falls_back_to_components() {
        let conn = store_fixture();
        let mut store = TaxonStore::open(&conn, "taxon").unwrap();
        let query = QueryTaxon::from_components("MOBULA", "alfredi", None).with_name("Mobula alfredi Smith");
        let result = MatchResolver::default().resolve(&mut store, &query).unwrap();

        assert_eq!(result.primary.as_ref().unwrap().id, "4");
        assert_eq!(result.method_label(), "components");
        assert_eq!(result.accepted, result.primary);
    }

    #[test]
    fn test_resolve_exhaustive_uses_both_methods() {
        let conn = store_fixture();
        let mut store = TaxonStore::open(&conn, "taxon").unwrap();
        let query = QueryTaxon::from_components("Mobula", "alfredi", None).with_name("Mobula alfredi");
        let result = MatchResolver::default()
            .with_search_mode(SearchMode::Exhaustive)
            .resolve(&mut store, &query)
            .unwrap();

        assert_eq!(result.method_label(), "scientificName,components");
        assert_eq!(result.candidates.len(), 1);
    }

    #[test]
    fn test_resolve_not_found() {
        let conn = store_fixture();
        let mut store = TaxonStore::open(&conn, "taxon").unwrap();
        let result = MatchResolver::default()
            .resolve(&mut store, &QueryTaxon::from_name("Nobody here"))
            .unwrap();

        assert!(!result.is_found());
        assert!(result.accepted.is_none());
        assert!(result.candidates.is_empty());
        assert_eq!(result.method_label(), "none");
    }
}
