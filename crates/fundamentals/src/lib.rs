#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Reconciled company fundamentals from XBRL company facts.
//!
//! This crate ties the workspace together: it re-exports the core types and
//! the reconciliation pipeline, and provides [`Fundamentals`] for fetching
//! documents from registered sources with automatic fallback.
//!
//! # Features
//!
//! - `edgar` (default) - SEC EDGAR fact source and ticker directory
//!
//! # Example
//!
//! ```rust,ignore
//! use fundamentals::{Cadence, Fundamentals, concept};
//!
//! #[tokio::main]
//! async fn main() -> fundamentals::Result<()> {
//!     let fundamentals = Fundamentals::new()
//!         .with_edgar("MyApp/1.0 (contact@example.com)")?;
//!
//!     let apple = fundamentals.company("AAPL").await?;
//!     let table = apple.table(&[concept::REVENUES, concept::NET_INCOME_LOSS], Cadence::Annual);
//!     println!("{:?}", table.to_dataframe()?);
//!
//!     let growth = apple.growth_rate(concept::REVENUES, Cadence::Annual, 5)?;
//!     println!("5-year revenue growth: {growth:?}");
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use fundamentals_core::*;

// Reconciliation pipeline
pub use fundamentals_concepts::{
    ConceptCoalescer, ConceptDefinition, ConceptKind, ConceptRegistry, FilingFilter, GrowthRate,
    Metric, RawSeriesExtractor, Reconciler, UndefinedGrowth, compute_growth_rate, concept,
    get_series, get_table, resolve_concept,
};

// Sources
#[cfg(feature = "edgar")]
pub use fundamentals_edgar::{EdgarConfig, EdgarProvider};

mod company;
mod registry;
pub use company::Company;
pub use registry::{DEFAULT_CONCURRENCY, Fundamentals};
