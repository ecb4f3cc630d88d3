//! Compound growth rate over a fixed number of periods.

use fundamentals_core::{ConceptSeries, FactsError, Result};
use std::fmt;

/// Why a growth rate could not be computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UndefinedGrowth {
    /// The series has fewer than `periods + 1` points.
    InsufficientHistory,
    /// The beginning value is zero.
    ZeroBase,
    /// Growth from a negative beginning value to a positive end value.
    NegativeBase,
    /// Beginning and end have opposite signs otherwise, so the root of the
    /// ratio is not real.
    NegativeRatio,
}

impl fmt::Display for UndefinedGrowth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InsufficientHistory => "insufficient history",
            Self::ZeroBase => "zero base",
            Self::NegativeBase => "negative base",
            Self::NegativeRatio => "negative ratio",
        })
    }
}

/// Result of [`compute_growth_rate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GrowthRate {
    /// Rate per period as a fraction (0.1 is 10%).
    Defined(f64),
    /// No meaningful rate.
    Undefined(UndefinedGrowth),
}

impl GrowthRate {
    /// Returns the rate, if defined.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Defined(rate) => Some(*rate),
            Self::Undefined(_) => None,
        }
    }

    /// Returns true for [`GrowthRate::Defined`].
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        matches!(self, Self::Defined(_))
    }
}

/// Computes `(end / begin)^(1 / periods) - 1`, with `end` the last value of
/// `series` and `begin` the value `periods` positions earlier.
///
/// # Errors
/// Returns [`FactsError::InvalidParameter`] when `periods` is zero.
pub fn compute_growth_rate(series: &ConceptSeries, periods: usize) -> Result<GrowthRate> {
    if periods == 0 {
        return Err(FactsError::InvalidParameter(
            "growth horizon must be at least one period".to_string(),
        ));
    }

    let values = series.values();
    if values.len() < periods + 1 {
        return Ok(GrowthRate::Undefined(UndefinedGrowth::InsufficientHistory));
    }

    let end = values[values.len() - 1];
    let begin = values[values.len() - 1 - periods];

    if begin == 0.0 {
        return Ok(GrowthRate::Undefined(UndefinedGrowth::ZeroBase));
    }
    if begin < 0.0 && end > 0.0 {
        return Ok(GrowthRate::Undefined(UndefinedGrowth::NegativeBase));
    }

    let ratio = end / begin;
    if ratio < 0.0 {
        return Ok(GrowthRate::Undefined(UndefinedGrowth::NegativeRatio));
    }

    #[allow(clippy::cast_precision_loss)]
    let exponent = 1.0 / periods as f64;
    Ok(GrowthRate::Defined(ratio.powf(exponent) - 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fundamentals_core::Cadence;

    fn series(values: &[f64]) -> ConceptSeries {
        ConceptSeries::from_values(
            "Revenues",
            Cadence::Annual,
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (NaiveDate::from_ymd_opt(2015 + i as i32, 12, 31).unwrap(), *v)),
        )
    }

    #[test]
    fn test_two_period_growth() {
        let rate = compute_growth_rate(&series(&[100.0, 110.0, 121.0]), 2).unwrap();
        assert!((rate.value().unwrap() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_uses_last_value_and_value_n_periods_earlier() {
        let rate = compute_growth_rate(&series(&[1.0, 100.0, 50.0, 121.0]), 2).unwrap();
        assert!((rate.value().unwrap() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_history() {
        assert_eq!(
            compute_growth_rate(&series(&[100.0, 121.0]), 2).unwrap(),
            GrowthRate::Undefined(UndefinedGrowth::InsufficientHistory)
        );
        assert!(!compute_growth_rate(&series(&[]), 1).unwrap().is_defined());
    }

    #[test]
    fn test_sign_edge_cases() {
        assert_eq!(
            compute_growth_rate(&series(&[0.0, 10.0]), 1).unwrap(),
            GrowthRate::Undefined(UndefinedGrowth::ZeroBase)
        );
        assert_eq!(
            compute_growth_rate(&series(&[-10.0, 10.0]), 1).unwrap(),
            GrowthRate::Undefined(UndefinedGrowth::NegativeBase)
        );
        assert_eq!(
            compute_growth_rate(&series(&[10.0, -10.0]), 1).unwrap(),
            GrowthRate::Undefined(UndefinedGrowth::NegativeRatio)
        );

        // Both negative: the ratio is positive and the formula applies.
        let rate = compute_growth_rate(&series(&[-100.0, -50.0]), 1).unwrap();
        assert!((rate.value().unwrap() + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_horizon_is_invalid() {
        assert!(matches!(
            compute_growth_rate(&series(&[1.0, 2.0]), 0),
            Err(FactsError::InvalidParameter(_))
        ));
    }
}
