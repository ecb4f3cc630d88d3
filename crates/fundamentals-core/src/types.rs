//! Core data types for reconciled company facts.
//!
//! This module defines the identifiers and the per-observation record:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`Cik`] - SEC Central Index Key
//! - [`EntityInfo`] - Directory entry resolving a symbol to a filer
//! - [`Observation`] - One reported value for one tag

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cadence::FormType;
use crate::error::FactsError;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// SEC Central Index Key identifying a filer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cik(u64);

impl Cik {
    /// Creates a CIK from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the CIK zero-padded to ten digits, e.g. `0000320193`.
    #[must_use]
    pub fn padded(&self) -> String {
        format!("{:010}", self.0)
    }
}

impl fmt::Display for Cik {
    /// Formats as the `CIK0000320193` form used in EDGAR URLs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CIK{:010}", self.0)
    }
}

impl FromStr for Cik {
    type Err = FactsError;

    /// Parses `"320193"`, `"0000320193"` or `"CIK0000320193"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("CIK")
            .or_else(|| trimmed.strip_prefix("cik"))
            .unwrap_or(trimmed);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| FactsError::InvalidParameter(format!("invalid CIK '{s}'")))
    }
}

impl From<u64> for Cik {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Directory entry resolving a trading symbol to a filer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    /// Trading symbol.
    pub symbol: Symbol,
    /// SEC CIK of the filer.
    pub cik: Cik,
    /// Registered company name.
    pub name: String,
}

impl EntityInfo {
    /// Creates a new directory entry.
    #[must_use]
    pub fn new(symbol: Symbol, cik: Cik, name: impl Into<String>) -> Self {
        Self {
            symbol,
            cik,
            name: name.into(),
        }
    }
}

/// One reported value for one tag at one point in time.
///
/// Observations are immutable once read from a fact document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Raw reporting label, e.g. `NetIncomeLoss`.
    pub tag: String,
    /// Reported value.
    pub value: f64,
    /// Unit of measure, e.g. `USD` or `shares`.
    pub unit: String,
    /// End of the reporting period (or the instant for balance sheet items).
    pub period_end: NaiveDate,
    /// Start of the reporting period for duration facts.
    pub period_start: Option<NaiveDate>,
    /// Filing type, e.g. `10-K`, `10-Q`, `10-K/A`.
    pub filing_type: String,
    /// Date the filing was submitted.
    pub filed_date: Option<NaiveDate>,
    /// Accession number of the source filing.
    pub accession_id: String,
    /// Fiscal year reported by the filer.
    pub fiscal_year: Option<i32>,
    /// Fiscal period reported by the filer (`FY`, `Q1`, ...).
    pub fiscal_period: Option<String>,
}

impl Observation {
    /// Creates an instant observation with the minimum required fields.
    #[must_use]
    pub fn new(
        tag: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        period_end: NaiveDate,
        filing_type: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            value,
            unit: unit.into(),
            period_end,
            period_start: None,
            filing_type: filing_type.into(),
            filed_date: None,
            accession_id: String::new(),
            fiscal_year: None,
            fiscal_period: None,
        }
    }

    /// Sets the period start, turning this into a duration observation.
    #[must_use]
    pub const fn with_period_start(mut self, start: NaiveDate) -> Self {
        self.period_start = Some(start);
        self
    }

    /// Sets the filing date.
    #[must_use]
    pub const fn with_filed_date(mut self, filed: NaiveDate) -> Self {
        self.filed_date = Some(filed);
        self
    }

    /// Sets the accession number.
    #[must_use]
    pub fn with_accession_id(mut self, accession_id: impl Into<String>) -> Self {
        self.accession_id = accession_id.into();
        self
    }

    /// Classifies the filing type.
    #[must_use]
    pub fn form_type(&self) -> FormType {
        FormType::parse(&self.filing_type)
    }

    /// Returns the duration in days for duration facts, `None` for instants.
    #[must_use]
    pub fn span_days(&self) -> Option<i64> {
        self.period_start
            .map(|start| self.period_end.signed_duration_since(start).num_days())
    }
}
