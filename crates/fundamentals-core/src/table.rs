//! Period-indexed table of reconciled concepts.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::cadence::Cadence;
use crate::error::{FactsError, Result};
use crate::series::ConceptSeries;

/// Name of the period column in exported data frames.
pub const PERIOD_COLUMN: &str = "period_end";

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// One named column of a [`FinancialTable`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Column name (the requested concept name).
    pub name: String,
    /// One cell per table period; `None` where the concept has no value.
    pub values: Vec<Option<f64>>,
}

/// Table with one row per period and one column per requested concept.
///
/// Periods are the union of the periods of every column's series, in
/// ascending order. Cells without a value stay `None`, never zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialTable {
    cadence: Cadence,
    periods: Vec<NaiveDate>,
    columns: Vec<TableColumn>,
}

impl FinancialTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new(cadence: Cadence) -> Self {
        Self {
            cadence,
            periods: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Outer-joins `series` on period end, one column per series in order.
    ///
    /// A series whose name is already present is ignored.
    #[must_use]
    pub fn from_series(cadence: Cadence, series: impl IntoIterator<Item = ConceptSeries>) -> Self {
        series
            .into_iter()
            .fold(Self::new(cadence), |table, s| table.with_series(&s))
    }

    /// Adds `series` as a new column, extending the period index if needed.
    #[must_use]
    pub fn with_series(mut self, series: &ConceptSeries) -> Self {
        if self.column(series.name()).is_some() {
            return self;
        }

        let periods: BTreeSet<NaiveDate> = self
            .periods
            .iter()
            .copied()
            .chain(series.periods())
            .collect();

        if periods.len() != self.periods.len() {
            let old_index: BTreeMap<NaiveDate, usize> = self
                .periods
                .iter()
                .enumerate()
                .map(|(i, d)| (*d, i))
                .collect();
            for column in &mut self.columns {
                column.values = periods
                    .iter()
                    .map(|d| old_index.get(d).and_then(|&i| column.values[i]))
                    .collect();
            }
            self.periods = periods.into_iter().collect();
        }

        let values = self.periods.iter().map(|d| series.get(*d)).collect();
        self.columns.push(TableColumn {
            name: series.name().to_string(),
            values,
        });
        self
    }

    /// Returns the cadence the table was built for.
    #[must_use]
    pub const fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Returns the period index in ascending order.
    #[must_use]
    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    /// Returns the columns in request order.
    #[must_use]
    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    /// Returns the column names in request order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Returns the cells of a column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Returns a single cell.
    #[must_use]
    pub fn value(&self, name: &str, period_end: NaiveDate) -> Option<f64> {
        let row = self.periods.binary_search(&period_end).ok()?;
        self.column(name)?[row]
    }

    /// Extracts a column back into a series, dropping missing cells.
    #[must_use]
    pub fn series(&self, name: &str) -> Option<ConceptSeries> {
        let column = self.column(name)?;
        let values = self
            .periods
            .iter()
            .zip(column)
            .filter_map(|(d, v)| v.map(|v| (*d, v)));
        Some(ConceptSeries::from_values(name, self.cadence, values))
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.periods.len()
    }

    /// Returns the number of concept columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Checks that every name in `columns` is a column of this table.
    ///
    /// # Errors
    /// Returns [`FactsError::InvalidParameter`] naming the first unknown column.
    pub fn require_columns(&self, columns: &[&str]) -> Result<()> {
        match columns.iter().find(|c| self.column(c).is_none()) {
            Some(missing) => Err(FactsError::InvalidParameter(format!(
                "column '{missing}' is not in the table"
            ))),
            None => Ok(()),
        }
    }

    /// Converts the table into a polars `DataFrame`.
    ///
    /// The frame has a `period_end` Date column followed by one Float64
    /// column per concept, with nulls for missing cells.
    ///
    /// # Errors
    /// Returns an error if polars rejects the columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let days: Vec<i32> = self
            .periods
            .iter()
            .map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
            .collect();

        let period_col = Column::new(PERIOD_COLUMN.into(), days)
            .cast(&DataType::Date)
            .map_err(|e| FactsError::Other(e.to_string()))?;

        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(period_col);
        for column in &self.columns {
            columns.push(Column::new(
                column.name.as_str().into(),
                column.values.clone(),
            ));
        }

        DataFrame::new(columns).map_err(|e| FactsError::Other(e.to_string()))
    }
}
