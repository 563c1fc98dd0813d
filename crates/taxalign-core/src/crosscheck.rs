//! One-record and batch crosschecks between two stores
//!
//! The authority store supplies the records under review; each one is
//! resolved against the catalogue store, both hierarchies are laddered and
//! aligned, and authorship is compared against the matched primary record.

use crate::alignment::{align, AlignmentResult};
use crate::authority::{self, AuthorityVerdict};
use crate::error::{ensure_active, Result};
use crate::ladder::RankLadder;
use crate::matcher::{MatchResolver, MatchResult};
use crate::record::{QueryTaxon, TaxonRecord};
use crate::source::TaxonSource;
use crate::store::TaxonStore;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Found,
    NotFound,
}

/// Result of checking one authority record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosscheckOutcome {
    /// The authority record under review
    pub subject: TaxonRecord,
    pub status: CheckStatus,
    pub match_result: MatchResult,
    /// Authority side only when nothing matched
    pub alignment: AlignmentResult,
    /// `None` when nothing matched
    pub authority: Option<AuthorityVerdict>,
}

impl CrosscheckOutcome {
    pub fn is_found(&self) -> bool {
        self.status == CheckStatus::Found
    }

    pub fn has_rank_mismatch(&self) -> bool {
        !self.alignment.mismatches().is_empty()
    }

    pub fn has_authority_mismatch(&self) -> bool {
        self.authority.is_some_and(AuthorityVerdict::is_mismatch)
    }
}

/// Counters over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosscheckSummary {
    pub checked: usize,
    pub found: usize,
    pub not_found: usize,
    pub synonym_redirects: usize,
    pub authority_mismatches: usize,
    pub rank_mismatches: usize,
}

impl CrosscheckSummary {
    pub fn record(&mut self, outcome: &CrosscheckOutcome) {
        self.checked += 1;
        if outcome.is_found() {
            self.found += 1;
        } else {
            self.not_found += 1;
        }
        if outcome.match_result.is_synonym_redirect() {
            self.synonym_redirects += 1;
        }
        if outcome.has_authority_mismatch() {
            self.authority_mismatches += 1;
        }
        if outcome.has_rank_mismatch() {
            self.rank_mismatches += 1;
        }
    }
}

/// Drives lookups from an authority store into a catalogue store
pub struct Crosschecker<A: TaxonSource, B: TaxonSource> {
    authority: TaxonStore<A>,
    catalogue: TaxonStore<B>,
    authority_label: String,
    catalogue_label: String,
    resolver: MatchResolver,
    page_size: usize,
    cancel: CancellationToken,
}

/// Authority rows read per page in [`Crosschecker::run_batch`]
pub const DEFAULT_PAGE_SIZE: usize = 500;

impl<A: TaxonSource, B: TaxonSource> Crosschecker<A, B> {
    pub fn new(authority: TaxonStore<A>, catalogue: TaxonStore<B>) -> Self {
        Self {
            authority,
            catalogue,
            authority_label: "authority".to_string(),
            catalogue_label: "catalogue".to_string(),
            resolver: MatchResolver::default(),
            page_size: DEFAULT_PAGE_SIZE,
            cancel: CancellationToken::new(),
        }
    }

    /// Column labels used in alignments
    pub fn with_labels(mut self, authority: impl Into<String>, catalogue: impl Into<String>) -> Self {
        self.authority_label = authority.into();
        self.catalogue_label = catalogue.into();
        self
    }

    pub fn with_resolver(mut self, resolver: MatchResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Rows per authority page; at least one
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Shares `token` with both stores
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.authority.set_cancellation(token.clone());
        self.catalogue.set_cancellation(token.clone());
        self.cancel = token;
        self
    }

    pub fn authority_store(&self) -> &TaxonStore<A> {
        &self.authority
    }

    pub fn catalogue_store(&self) -> &TaxonStore<B> {
        &self.catalogue
    }

    /// Check one record taken from the authority store
    pub fn check_record(&mut self, subject: &TaxonRecord) -> Result<CrosscheckOutcome> {
        ensure_active(&self.cancel)?;
        let authority_ladder = ladder_for(&mut self.authority, &self.authority_label, subject)?;

        let query = QueryTaxon::from_record(subject);
        let match_result = self.resolver.resolve(&mut self.catalogue, &query)?;

        let Some(primary) = match_result.primary.as_ref() else {
            debug!(id = %subject.id, name = %subject.scientific_name, "Not found in catalogue");
            return Ok(CrosscheckOutcome {
                subject: subject.clone(),
                status: CheckStatus::NotFound,
                alignment: align(&[authority_ladder]),
                match_result,
                authority: None,
            });
        };

        let verdict = authority::compare(subject.authorship.as_deref(), primary.authorship.as_deref());
        let target = match_result.target().unwrap_or(primary).clone();
        let catalogue_ladder = ladder_for(&mut self.catalogue, &self.catalogue_label, &target)?;
        let alignment = align(&[authority_ladder, catalogue_ladder]);

        debug!(
            id = %subject.id,
            matched = %target.id,
            method = %match_result.method_label(),
            authority = %verdict,
            rank_mismatches = alignment.mismatches().len(),
            "Crosschecked record"
        );

        Ok(CrosscheckOutcome {
            subject: subject.clone(),
            status: CheckStatus::Found,
            match_result,
            alignment,
            authority: Some(verdict),
        })
    }

    /// Look `name` up in the authority store and check the best hit
    ///
    /// `Ok(None)` when the authority store has no such name.
    pub fn check_name(&mut self, name: &str) -> Result<Option<CrosscheckOutcome>> {
        let query = QueryTaxon::from_name(name);
        let found = self.resolver.resolve(&mut self.authority, &query)?;
        match found.primary {
            Some(subject) => self.check_record(&subject).map(Some),
            None => Ok(None),
        }
    }

    /// Check up to `limit` authority rows in table order
    ///
    /// The authority table is read one page at a time. `on_outcome` sees every
    /// outcome as it is produced. Cancellation is checked between records and
    /// inside every lookup.
    pub fn run_batch<F>(&mut self, limit: Option<usize>, mut on_outcome: F) -> Result<CrosscheckSummary>
    where
        F: FnMut(&CrosscheckOutcome),
    {
        info!(
            authority = self.authority.table(),
            catalogue = self.catalogue.table(),
            limit = ?limit,
            page_size = self.page_size,
            "Starting crosscheck batch"
        );

        let mut summary = CrosscheckSummary::default();
        let mut offset = 0usize;
        loop {
            let size = match limit {
                Some(limit) => self.page_size.min(limit.saturating_sub(offset)),
                None => self.page_size,
            };
            if size == 0 {
                break;
            }

            let page = self.authority.scan_page(offset, size)?;
            for subject in &page.records {
                ensure_active(&self.cancel)?;
                let outcome = self.check_record(subject)?;
                summary.record(&outcome);
                on_outcome(&outcome);
            }

            offset += page.rows;
            if page.rows < size {
                break;
            }
        }

        info!(
            checked = summary.checked,
            found = summary.found,
            not_found = summary.not_found,
            synonym_redirects = summary.synonym_redirects,
            authority_mismatches = summary.authority_mismatches,
            rank_mismatches = summary.rank_mismatches,
            "Crosscheck batch finished"
        );
        Ok(summary)
    }
}

/// Lineage ladder when the store links parents, flat classification otherwise
fn ladder_for<S: TaxonSource>(store: &mut TaxonStore<S>, label: &str, record: &TaxonRecord) -> Result<RankLadder> {
    let chain = store.get_parent_chain(record)?;
    if chain.len() > 1 {
        Ok(RankLadder::from_lineage(label, &chain))
    } else {
        Ok(RankLadder::from_classification(label, record))
    }
}
