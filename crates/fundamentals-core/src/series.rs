//! Reconciled per-concept time series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cadence::Cadence;

/// One resolved value of a concept series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// End of the reporting period.
    pub period_end: NaiveDate,
    /// Resolved value.
    pub value: f64,
    /// Raw tag the value was taken from; `None` for computed values.
    pub source: Option<String>,
}

impl SeriesPoint {
    /// Creates a computed point with no source tag.
    #[must_use]
    pub const fn new(period_end: NaiveDate, value: f64) -> Self {
        Self {
            period_end,
            value,
            source: None,
        }
    }

    /// Creates a point taken from a raw tag.
    #[must_use]
    pub fn from_tag(period_end: NaiveDate, value: f64, tag: impl Into<String>) -> Self {
        Self {
            period_end,
            value,
            source: Some(tag.into()),
        }
    }
}

/// Ordered `(period_end, value)` sequence for one concept and one cadence.
///
/// Periods are unique and strictly increasing; every constructor enforces
/// this by keying points on `period_end`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptSeries {
    name: String,
    cadence: Cadence,
    points: Vec<SeriesPoint>,
}

impl ConceptSeries {
    /// Creates an empty series (the "no data" result).
    #[must_use]
    pub fn empty(name: impl Into<String>, cadence: Cadence) -> Self {
        Self {
            name: name.into(),
            cadence,
            points: Vec::new(),
        }
    }

    /// Creates a series from points keyed by period end.
    #[must_use]
    pub fn from_map(
        name: impl Into<String>,
        cadence: Cadence,
        points: BTreeMap<NaiveDate, SeriesPoint>,
    ) -> Self {
        Self {
            name: name.into(),
            cadence,
            points: points.into_values().collect(),
        }
    }

    /// Creates a computed series from `(period_end, value)` pairs.
    ///
    /// When a period appears more than once the last pair wins.
    #[must_use]
    pub fn from_values(
        name: impl Into<String>,
        cadence: Cadence,
        values: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        let points = values
            .into_iter()
            .map(|(date, value)| (date, SeriesPoint::new(date, value)))
            .collect();
        Self::from_map(name, cadence, points)
    }

    /// Returns the concept name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cadence this series was resolved for.
    #[must_use]
    pub const fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Returns the same series under a different name.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the series has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the points in ascending period order.
    #[must_use]
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    /// Returns an iterator over `(period_end, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|p| (p.period_end, p.value))
    }

    /// Returns the period ends in ascending order.
    pub fn periods(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.period_end)
    }

    /// Returns the values in ascending period order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Returns the value at `period_end`, if resolved.
    #[must_use]
    pub fn get(&self, period_end: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by(|p| p.period_end.cmp(&period_end))
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Returns the earliest point.
    #[must_use]
    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    /// Returns the latest point.
    #[must_use]
    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    /// Keeps only the most recent `n` periods.
    #[must_use]
    pub fn tail(mut self, n: usize) -> Self {
        let skip = self.points.len().saturating_sub(n);
        self.points.drain(..skip);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_series_is_sorted_and_unique() {
        let series = ConceptSeries::from_values(
            "Revenues",
            Cadence::Annual,
            vec![
                (date(2022, 12, 31), 2.0),
                (date(2021, 12, 31), 1.0),
                (date(2022, 12, 31), 3.0),
            ],
        );

        assert_eq!(series.len(), 2);
        assert_eq!(
            series.periods().collect::<Vec<_>>(),
            vec![date(2021, 12, 31), date(2022, 12, 31)]
        );
        assert_eq!(series.get(date(2022, 12, 31)), Some(3.0));
        assert_eq!(series.get(date(2020, 12, 31)), None);
    }

    #[test]
    fn test_tail() {
        let series = ConceptSeries::from_values(
            "Assets",
            Cadence::Quarterly,
            (1..=4).map(|q| (date(2023, q * 3, 28), f64::from(q))),
        );
        let tail = series.tail(2);
        assert_eq!(tail.values(), vec![3.0, 4.0]);
        assert_eq!(tail.name(), "Assets");
    }
}
