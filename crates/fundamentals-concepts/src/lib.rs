#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Concept reconciliation for tagged company facts.
//!
//! Filers report the same line item under many different tags, in several
//! units, and restate prior periods in later filings. This crate turns a
//! [`FactDocument`] into one clean series per canonical concept:
//!
//! - [`ConceptRegistry`](registry::ConceptRegistry) - Concept to synonym tags
//! - [`RawSeriesExtractor`](extract::RawSeriesExtractor) - Tag lookup and unit choice
//! - [`FilingFilter`](filter::FilingFilter) - Cadence filter and restatement dedup
//! - [`ConceptCoalescer`](coalesce::ConceptCoalescer) - Synonym merge and line-item sums
//! - [`Metric`](derived::Metric) - Ratios and combinations of concepts
//! - [`Reconciler`](reconcile::Reconciler) - The assembled pipeline

use fundamentals_core::{Cadence, ConceptSeries, FactDocument, FinancialTable};

/// Merging synonym series.
pub mod coalesce;
/// Derived metrics.
pub mod derived;
/// Observation extraction and unit selection.
pub mod extract;
/// Cadence filtering and deduplication.
pub mod filter;
/// Growth rates.
pub mod growth;
/// Pipeline over one document.
pub mod reconcile;
/// Concept catalog.
pub mod registry;

pub use coalesce::{ConceptCoalescer, SynonymSeries};
pub use derived::{Metric, SeriesResolver};
pub use extract::{DEFAULT_PREFERRED_UNITS, ExtractedSeries, RawSeriesExtractor, UnitChoice};
pub use filter::FilingFilter;
pub use growth::{GrowthRate, UndefinedGrowth, compute_growth_rate};
pub use reconcile::Reconciler;
pub use registry::{ConceptDefinition, ConceptKind, ConceptRegistry, concept};

/// Returns the ordered tags for `name`; an unregistered name maps to itself.
#[must_use]
pub fn resolve_concept(name: &str) -> Vec<&str> {
    ConceptRegistry::global().synonyms_for(name)
}

/// Resolves one concept, metric or raw tag from `document`.
#[must_use]
pub fn get_series(document: &FactDocument, concept: &str, cadence: Cadence) -> ConceptSeries {
    Reconciler::new(document).series(concept, cadence)
}

/// Builds a period-indexed table of `concepts` from `document`.
#[must_use]
pub fn get_table(document: &FactDocument, concepts: &[&str], cadence: Cadence) -> FinancialTable {
    Reconciler::new(document).table(concepts, cadence)
}
