//! Relational read interface over reference tables
//!
//! The engine never writes SQL. A [`TaxonStore`](crate::store::TaxonStore)
//! describes what it wants as a [`Selection`] of already-resolved column names
//! and a closed set of [`Predicate`]s; each backend renders that into its own
//! query language.

pub mod sqlite;

use crate::error::Result;

/// One fetched row: text cells aligned with [`Selection::columns`]
pub type SourceRow = Vec<Option<String>>;

/// Row filter understood by every source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Trimmed, case-insensitive equality (full Unicode lower-casing)
    EqualsIgnoreCase { column: String, value: String },
    /// Exact equality (identifier lookups)
    Equals { column: String, value: String },
    /// Column is NULL or only whitespace
    NullOrBlank { column: String },
}

impl Predicate {
    pub fn equals_ignore_case(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::EqualsIgnoreCase {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn equals(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn null_or_blank(column: impl Into<String>) -> Self {
        Self::NullOrBlank {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Self::EqualsIgnoreCase { column, .. }
            | Self::Equals { column, .. }
            | Self::NullOrBlank { column } => column,
        }
    }
}

/// A projection + filter over one table
///
/// Predicates are AND-ed. Rows come back in the source's natural order;
/// `offset` skips that many matching rows before `limit` applies.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub table: &'a str,
    pub columns: &'a [String],
    pub predicates: &'a [Predicate],
    pub limit: Option<usize>,
    pub offset: usize,
}

/// Read access to a relational reference dataset
pub trait TaxonSource {
    /// Actual column names of `table`, in declaration order
    fn column_names(&self, table: &str) -> Result<Vec<String>>;

    /// Fetch rows matching `selection`
    fn select(&self, selection: &Selection<'_>) -> Result<Vec<SourceRow>>;
}

impl<T: TaxonSource + ?Sized> TaxonSource for &T {
    fn column_names(&self, table: &str) -> Result<Vec<String>> {
        (**self).column_names(table)
    }

    fn select(&self, selection: &Selection<'_>) -> Result<Vec<SourceRow>> {
        (**self).select(selection)
    }
}

impl<T: TaxonSource + ?Sized> TaxonSource for Box<T> {
    fn column_names(&self, table: &str) -> Result<Vec<String>> {
        (**self).column_names(table)
    }

    fn select(&self, selection: &Selection<'_>) -> Result<Vec<SourceRow>> {
        (**self).select(selection)
    }
}
