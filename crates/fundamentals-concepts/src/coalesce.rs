//! Merging per-synonym series into one series per concept.

use chrono::NaiveDate;
use fundamentals_core::{Cadence, ConceptSeries, Observation, SeriesPoint};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::filter::FilingFilter;
use crate::registry::ConceptRegistry;

/// Filtered values of one synonym tag, one per period end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SynonymSeries {
    tag: String,
    values: BTreeMap<NaiveDate, f64>,
}

impl SynonymSeries {
    /// Creates an empty series for `tag`.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            values: BTreeMap::new(),
        }
    }

    /// Collapses filtered observations to one value per period end,
    /// keeping the most recently filed observation.
    #[must_use]
    pub fn from_observations(
        tag: impl Into<String>,
        observations: impl IntoIterator<Item = Observation>,
    ) -> Self {
        let values = FilingFilter::latest_per_period(observations)
            .into_iter()
            .map(|(end, o)| (end, o.value))
            .collect();
        Self {
            tag: tag.into(),
            values,
        }
    }

    /// Creates a series from `(period_end, value)` pairs; the last pair for a
    /// period wins.
    #[must_use]
    pub fn from_values(
        tag: impl Into<String>,
        values: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        Self {
            tag: tag.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Returns the tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the value at `period_end`.
    #[must_use]
    pub fn get(&self, period_end: NaiveDate) -> Option<f64> {
        self.values.get(&period_end).copied()
    }

    /// Returns the number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the series has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn periods(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.values.keys().copied()
    }
}

/// Combines synonym series into a [`ConceptSeries`].
#[derive(Clone, Copy, Debug)]
pub struct ConceptCoalescer<'a> {
    registry: &'a ConceptRegistry,
}

impl Default for ConceptCoalescer<'static> {
    fn default() -> Self {
        Self::new(ConceptRegistry::global())
    }
}

impl<'a> ConceptCoalescer<'a> {
    /// Creates a coalescer reporting shared tags of `registry`.
    #[must_use]
    pub const fn new(registry: &'a ConceptRegistry) -> Self {
        Self { registry }
    }

    /// Picks, for every period, the value of the highest-priority synonym
    /// that has one.
    ///
    /// `series` are ranked by the position of their tag in `priority`;
    /// series whose tag is not listed rank after every listed one, in the
    /// order given. Values are never blended.
    #[must_use]
    pub fn coalesce(
        &self,
        name: &str,
        cadence: Cadence,
        series: &[SynonymSeries],
        priority: &[&str],
    ) -> ConceptSeries {
        let mut ranked: Vec<&SynonymSeries> = series.iter().collect();
        ranked.sort_by_key(|s| {
            priority
                .iter()
                .position(|p| *p == s.tag)
                .unwrap_or(priority.len())
        });

        let mut points: BTreeMap<NaiveDate, SeriesPoint> = BTreeMap::new();
        for synonym in ranked {
            for (&end, &value) in &synonym.values {
                if points.contains_key(&end) {
                    continue;
                }
                if self.registry.is_shared(&synonym.tag) {
                    warn!(
                        concept = %name,
                        tag = %synonym.tag,
                        period = %end,
                        "Resolved period from a tag shared between concepts"
                    );
                }
                points.insert(end, SeriesPoint::from_tag(end, value, synonym.tag.clone()));
            }
        }

        debug!(concept = %name, periods = points.len(), "Coalesced synonyms");
        ConceptSeries::from_map(name, cadence, points)
    }

    /// Sums distinct line items per period.
    ///
    /// A period exists when at least one item reports it; items absent at a
    /// period contribute nothing. When several items report the identical
    /// value for a period it is counted once, since filers commonly repeat a
    /// line item under a second tag.
    #[must_use]
    pub fn aggregate(&self, name: &str, cadence: Cadence, items: &[SynonymSeries]) -> ConceptSeries {
        let periods: BTreeSet<NaiveDate> = items.iter().flat_map(|s| s.periods()).collect();

        let values = periods.into_iter().map(|end| {
            let mut seen: Vec<u64> = Vec::new();
            let mut total = 0.0;
            for value in items.iter().filter_map(|s| s.get(end)) {
                let bits = value.to_bits();
                if !seen.contains(&bits) {
                    seen.push(bits);
                    total += value;
                }
            }
            (end, total)
        });

        let series = ConceptSeries::from_values(name, cadence, values);
        debug!(
            concept = %name,
            items = items.iter().filter(|s| !s.is_empty()).count(),
            periods = series.len(),
            "Aggregated line items"
        );
        series
    }
}
