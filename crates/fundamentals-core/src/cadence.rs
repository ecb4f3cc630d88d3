//! Reporting cadence and filing form classification.
//!
//! This module defines [`Cadence`] for the reporting frequency a caller asks
//! for and [`FormType`] for classifying the filing type carried by each
//! observation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FactsError;

/// Suffix marking an amendment of a base filing type (e.g. `10-K/A`).
const AMENDMENT_SUFFIX: &str = "/A";

/// Inclusive bounds, in days, for a duration fact to count as a fiscal year.
///
/// Covers 52/53-week fiscal years.
const ANNUAL_SPAN_DAYS: (i64, i64) = (340, 380);

/// Inclusive bounds, in days, for a duration fact to count as a fiscal quarter.
const QUARTERLY_SPAN_DAYS: (i64, i64) = (80, 100);

/// Reporting cadence requested by a caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cadence {
    /// Annual reports (10-K, 20-F, 40-F and their amendments).
    #[default]
    Annual,
    /// Quarterly reports (10-Q and its amendments).
    Quarterly,
    /// Every observation regardless of filing type.
    Unfiltered,
}

impl Cadence {
    /// Returns true if an observation filed on `form` belongs to this cadence.
    #[must_use]
    pub fn accepts_form(&self, form: &str) -> bool {
        match self {
            Self::Annual => FormType::parse(form).is_annual(),
            Self::Quarterly => FormType::parse(form).is_quarterly(),
            Self::Unfiltered => true,
        }
    }

    /// Returns true if a duration of `span_days` matches this cadence.
    ///
    /// Instant facts (`None`) always match.
    #[must_use]
    pub const fn accepts_span(&self, span_days: Option<i64>) -> bool {
        let Some(days) = span_days else {
            return true;
        };
        match self {
            Self::Annual => days >= ANNUAL_SPAN_DAYS.0 && days <= ANNUAL_SPAN_DAYS.1,
            Self::Quarterly => days >= QUARTERLY_SPAN_DAYS.0 && days <= QUARTERLY_SPAN_DAYS.1,
            Self::Unfiltered => true,
        }
    }

    /// Returns the canonical lowercase name of this cadence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
            Self::Unfiltered => "unfiltered",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cadence {
    type Err = FactsError;

    /// Accepts cadence names as well as the base form types callers of the
    /// filings API are used to passing (`"10-K"`, `"10-Q"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "a" | "fy" | "10-k" | "20-f" | "40-f" => Ok(Self::Annual),
            "quarterly" | "q" | "10-q" => Ok(Self::Quarterly),
            "unfiltered" | "all" | "any" => Ok(Self::Unfiltered),
            other => Err(FactsError::InvalidParameter(format!(
                "unknown cadence '{other}'"
            ))),
        }
    }
}

/// Classification of a filing type string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormType {
    /// An annual report form, possibly amended.
    Annual {
        /// True for `/A` variants.
        amended: bool,
    },
    /// A quarterly report form, possibly amended.
    Quarterly {
        /// True for `/A` variants.
        amended: bool,
    },
    /// Any other form (8-K, S-1, proxy statements, ...).
    Other,
}

impl FormType {
    /// Classifies a filing type such as `"10-K"`, `"10-K/A"` or `"20-F"`.
    #[must_use]
    pub fn parse(form: &str) -> Self {
        let form = form.trim().to_ascii_uppercase();
        let (base, amended) = match form.strip_suffix(AMENDMENT_SUFFIX) {
            Some(base) => (base, true),
            None => (form.as_str(), false),
        };
        match base {
            "10-K" | "10-KT" | "20-F" | "40-F" => Self::Annual { amended },
            "10-Q" | "10-QT" => Self::Quarterly { amended },
            _ => Self::Other,
        }
    }

    /// Returns true for annual forms and their amendments.
    #[must_use]
    pub const fn is_annual(&self) -> bool {
        matches!(self, Self::Annual { .. })
    }

    /// Returns true for quarterly forms and their amendments.
    #[must_use]
    pub const fn is_quarterly(&self) -> bool {
        matches!(self, Self::Quarterly { .. })
    }

    /// Returns true for `/A` amendment variants.
    #[must_use]
    pub const fn is_amendment(&self) -> bool {
        matches!(
            self,
            Self::Annual { amended: true } | Self::Quarterly { amended: true }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_classification() {
        assert_eq!(FormType::parse("10-K"), FormType::Annual { amended: false });
        assert_eq!(FormType::parse("10-K/A"), FormType::Annual { amended: true });
        assert_eq!(FormType::parse("20-F"), FormType::Annual { amended: false });
        assert_eq!(FormType::parse("10-q"), FormType::Quarterly { amended: false });
        assert_eq!(FormType::parse("8-K"), FormType::Other);
        assert!(FormType::parse("40-F/A").is_amendment());
    }

    #[test]
    fn test_cadence_accepts_form() {
        assert!(Cadence::Annual.accepts_form("10-K"));
        assert!(Cadence::Annual.accepts_form("10-K/A"));
        assert!(!Cadence::Annual.accepts_form("10-Q"));
        assert!(Cadence::Quarterly.accepts_form("10-Q"));
        assert!(!Cadence::Quarterly.accepts_form("10-K/A"));
        assert!(Cadence::Unfiltered.accepts_form("8-K"));
    }

    #[test]
    fn test_cadence_accepts_span() {
        assert!(Cadence::Annual.accepts_span(None));
        assert!(Cadence::Annual.accepts_span(Some(364)));
        assert!(Cadence::Annual.accepts_span(Some(371)));
        assert!(!Cadence::Annual.accepts_span(Some(91)));
        assert!(Cadence::Quarterly.accepts_span(Some(91)));
        assert!(!Cadence::Quarterly.accepts_span(Some(273)));
        assert!(Cadence::Unfiltered.accepts_span(Some(1)));
    }

    #[test]
    fn test_cadence_from_str() {
        assert_eq!("10-K".parse::<Cadence>().unwrap(), Cadence::Annual);
        assert_eq!("Quarterly".parse::<Cadence>().unwrap(), Cadence::Quarterly);
        assert_eq!("all".parse::<Cadence>().unwrap(), Cadence::Unfiltered);
        assert!(matches!(
            "weekly".parse::<Cadence>(),
            Err(FactsError::InvalidParameter(_))
        ));
    }
}
