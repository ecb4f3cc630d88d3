#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and traits for reconciled company fundamentals.
//!
//! This crate provides the data model shared by the reconciliation pipeline
//! and its collaborators:
//!
//! - [`Observation`](types::Observation) - One reported value for one tag
//! - [`FactDocument`](document::FactDocument) - An entity's tagged-fact document
//! - [`ConceptSeries`](series::ConceptSeries) - One reconciled concept over time
//! - [`FinancialTable`](table::FinancialTable) - Concepts outer-joined on period
//! - [`FactSource`](source::FactSource) - Fetches fact documents
//! - [`ChartRenderer`](source::ChartRenderer) - Presentation sink

/// Reporting cadence and form type classification.
pub mod cadence;
/// Tagged-fact documents.
pub mod document;
/// Error types for fact operations.
pub mod error;
/// Reconciled concept series.
pub mod series;
/// Collaborator traits (fact sources, directories, chart renderers).
pub mod source;
/// Period-indexed tables.
pub mod table;
/// Identifiers and observations.
pub mod types;

// Re-export commonly used items at crate root
pub use cadence::{Cadence, FormType};
pub use document::{AUXILIARY_TAXONOMIES, FactDocument, RawFact, TagFacts, Taxonomy, UnitFacts};
pub use error::{FactsError, Result};
pub use series::{ConceptSeries, SeriesPoint};
pub use source::{ChartKind, ChartRenderer, DataSource, EntityDirectory, FactSource};
pub use table::{FinancialTable, PERIOD_COLUMN, TableColumn};
pub use types::{Cik, EntityInfo, Observation, Symbol};
