//! Taxalign Core
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Reconciles taxon records between independently curated reference tables,
//! typically a conservation-status authority and a general taxonomic catalogue.
//!
//! # Components
//!
//! - [`rank`]: canonical rank order and rank-text normalization
//! - [`store`]: schema-adaptive, memoizing lookups over one reference table
//! - [`authority`]: authorship citation normalization and comparison
//! - [`matcher`]: candidate retrieval, tie-break selection, accepted-name redirect
//! - [`ladder`]: per-source rank → name ladders
//! - [`alignment`]: rank-by-rank merge of several ladders
//! - [`crosscheck`]: one-record and batch drivers over two stores
//!
//! Everything is synchronous. Each [`store::TaxonStore`] owns its caches and is
//! driven through `&mut self`; share one across threads only behind a lock.
//! Long-running work polls a [`CancellationToken`] and unwinds with
//! [`EngineError::Cancelled`].
//!
//! # Example
//!
//! ```no_run
//! use taxalign_core::matcher::MatchResolver;
//! use taxalign_core::record::QueryTaxon;
//! use taxalign_core::source::sqlite::open_read_only;
//! use taxalign_core::store::TaxonStore;
//!
//! # fn main() -> taxalign_core::Result<()> {
//! let conn = open_read_only("catalogue.sqlite")?;
//! let mut store = TaxonStore::open(&conn, "taxon")?;
//! let result = MatchResolver::default().resolve(&mut store, &QueryTaxon::from_name("Mobula alfredi"))?;
//! if let Some(primary) = &result.primary {
//!     println!("{} ({})", primary.scientific_name, result.method_label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod alignment;
pub mod authority;
pub mod crosscheck;
pub mod error;
pub mod ladder;
pub mod matcher;
pub mod rank;
pub mod record;
pub mod source;
pub mod store;

// Re-export commonly used types
pub use error::{EngineError, Result};
pub use tokio_util::sync::CancellationToken;
