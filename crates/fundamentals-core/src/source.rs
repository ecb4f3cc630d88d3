//! Collaborator traits at the edges of the reconciliation core.
//!
//! This module defines:
//!
//! - [`DataSource`] - Base trait for all sources
//! - [`FactSource`] - Fetches an entity's tagged-fact document
//! - [`EntityDirectory`] - Resolves trading symbols to filers
//! - [`ChartRenderer`] - Presentation sink for tables

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::{
    document::FactDocument,
    error::{FactsError, Result},
    table::FinancialTable,
    types::{Cik, EntityInfo, Symbol},
};

/// Base trait for all data sources.
pub trait DataSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "SEC EDGAR").
    fn name(&self) -> &str;

    /// Returns a description of this source.
    fn description(&self) -> &str;
}

/// Source of tagged-fact documents.
///
/// Implementations own transport concerns (rate limiting, timeouts). A
/// document whose structure is wrong should be reported as
/// [`FactsError::MalformedDocument`] so callers can treat it as "no data".
#[async_trait]
pub trait FactSource: DataSource {
    /// Fetches the complete fact document for a filer.
    async fn fetch_facts(&self, cik: &Cik) -> Result<FactDocument>;
}

/// Directory resolving trading symbols to filers.
#[async_trait]
pub trait EntityDirectory: DataSource {
    /// Looks up the filer behind a trading symbol.
    async fn lookup(&self, symbol: &Symbol) -> Result<EntityInfo>;

    /// Checks if a symbol is known to this directory.
    async fn supports_symbol(&self, symbol: &Symbol) -> Result<bool> {
        match self.lookup(symbol).await {
            Ok(_) => Ok(true),
            Err(FactsError::EntityNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Kind of chart requested from a [`ChartRenderer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    /// Line chart.
    #[default]
    Line,
    /// Bar chart.
    Bar,
    /// Filled area chart.
    Area,
    /// Gauge showing a single figure (e.g. a growth rate).
    Gauge,
}

/// Presentation sink turning a table into a chart.
///
/// The core only supplies the table and explicit column names; styling is
/// entirely up to the implementation.
pub trait ChartRenderer: Send + Sync + Debug {
    /// Handle returned for a rendered chart.
    type Handle;

    /// Renders `columns` of `table`.
    fn render(
        &self,
        table: &FinancialTable,
        columns: &[&str],
        kind: ChartKind,
        title: &str,
    ) -> Result<Self::Handle>;
}
