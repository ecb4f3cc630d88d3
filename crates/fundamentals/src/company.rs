//! Per-entity request handle.

use std::sync::Arc;

use polars::prelude::DataFrame;
use tracing::debug;

use fundamentals_concepts::{GrowthRate, Reconciler, compute_growth_rate};
use fundamentals_core::{
    Cadence, ChartKind, ChartRenderer, Cik, ConceptSeries, EntityInfo, FactDocument,
    FinancialTable, Result, Symbol,
};

/// One entity with its fact document, fetched once and reused for every
/// concept requested through this handle.
///
/// Cloning is cheap: the document is shared.
#[derive(Clone, Debug)]
pub struct Company {
    info: EntityInfo,
    document: Arc<FactDocument>,
}

impl Company {
    /// Wraps an already fetched document.
    #[must_use]
    pub fn new(info: EntityInfo, document: FactDocument) -> Self {
        Self {
            info,
            document: Arc::new(document),
        }
    }

    /// Returns the directory entry.
    #[must_use]
    pub const fn info(&self) -> &EntityInfo {
        &self.info
    }

    /// Returns the trading symbol (empty when opened by CIK).
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.info.symbol
    }

    /// Returns the CIK.
    #[must_use]
    pub const fn cik(&self) -> Cik {
        self.info.cik
    }

    /// Returns the company name, falling back to the name in the document.
    #[must_use]
    pub fn name(&self) -> &str {
        if self.info.name.is_empty() {
            self.document.entity_name().unwrap_or_default()
        } else {
            &self.info.name
        }
    }

    /// Returns the fact document.
    #[must_use]
    pub fn document(&self) -> &FactDocument {
        &self.document
    }

    /// Resolves one concept, metric or raw tag.
    #[must_use]
    pub fn series(&self, concept: &str, cadence: Cadence) -> ConceptSeries {
        Reconciler::new(&self.document).series(concept, cadence)
    }

    /// Builds a table of `concepts`.
    #[must_use]
    pub fn table(&self, concepts: &[&str], cadence: Cadence) -> FinancialTable {
        Reconciler::new(&self.document).table(concepts, cadence)
    }

    /// Builds a table of `concepts` as a polars `DataFrame`.
    ///
    /// # Errors
    /// Returns an error if the frame cannot be built.
    pub fn frame(&self, concepts: &[&str], cadence: Cadence) -> Result<DataFrame> {
        self.table(concepts, cadence).to_dataframe()
    }

    /// Compound growth rate of `concept` over the last `periods` periods.
    ///
    /// # Errors
    /// Returns [`FactsError::InvalidParameter`](fundamentals_core::FactsError::InvalidParameter)
    /// when `periods` is zero.
    pub fn growth_rate(&self, concept: &str, cadence: Cadence, periods: usize) -> Result<GrowthRate> {
        let series = self.series(concept, cadence);
        let rate = compute_growth_rate(&series, periods)?;
        debug!(
            company = %self.name(),
            concept = %concept,
            periods,
            rate = ?rate,
            "Computed growth rate"
        );
        Ok(rate)
    }

    /// Hands `columns` of `table` to `renderer`.
    ///
    /// # Errors
    /// Returns [`FactsError::InvalidParameter`](fundamentals_core::FactsError::InvalidParameter)
    /// when a column is not in the table, or the renderer's error.
    pub fn chart<R: ChartRenderer>(
        &self,
        renderer: &R,
        table: &FinancialTable,
        columns: &[&str],
        kind: ChartKind,
        title: &str,
    ) -> Result<R::Handle> {
        table.require_columns(columns)?;
        debug!(
            company = %self.name(),
            columns = ?columns,
            kind = ?kind,
            "Rendering chart"
        );
        renderer.render(table, columns, kind, title)
    }

    /// Builds a table of `concepts` and renders all of them, titled with the
    /// company name.
    ///
    /// # Errors
    /// Returns the renderer's error.
    pub fn plot<R: ChartRenderer>(
        &self,
        renderer: &R,
        concepts: &[&str],
        cadence: Cadence,
        kind: ChartKind,
    ) -> Result<R::Handle> {
        let table = self.table(concepts, cadence);
        let columns: Vec<&str> = table.column_names().collect();
        let title = format!("{} - {}", self.name(), columns.join(", "));
        self.chart(renderer, &table, &columns, kind, &title)
    }
}
