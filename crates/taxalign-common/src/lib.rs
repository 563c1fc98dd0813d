//! Taxalign Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the taxalign workspace members:
//!
//! - **Error Handling**: [`TaxalignError`] and the [`Result`] alias
//! - **Logging**: `tracing` subscriber setup driven by [`logging::LogConfig`]
//! - **Environment**: typed lookups of `TAXALIGN_*` variables
//!
//! # Example
//!
//! ```no_run
//! use taxalign_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> taxalign_common::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod env;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{Result, TaxalignError};
