//! Cadence filtering and amendment-aware deduplication.

use chrono::NaiveDate;
use fundamentals_core::{Cadence, Observation};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::trace;

/// Keeps the observations matching a reporting cadence, one per
/// `(period_end, filing_type)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FilingFilter;

impl FilingFilter {
    /// Filters `observations` to `cadence`, then deduplicates them.
    ///
    /// An observation passes when its filing type belongs to the cadence and,
    /// for duration facts, its span has the length of one such period. The
    /// result is ordered by period end, then filing type.
    #[must_use]
    pub fn filter(observations: Vec<Observation>, cadence: Cadence) -> Vec<Observation> {
        let kept = observations.into_iter().filter(|o| {
            let keep = cadence.accepts_form(&o.filing_type) && cadence.accepts_span(o.span_days());
            if !keep {
                trace!(
                    tag = %o.tag,
                    end = %o.period_end,
                    form = %o.filing_type,
                    span = ?o.span_days(),
                    %cadence,
                    "Observation outside cadence"
                );
            }
            keep
        });
        Self::dedupe(kept)
    }

    /// Retains, for each `(period_end, filing_type)`, the most recently
    /// filed observation.
    ///
    /// A missing filed date counts as earlier than any date; between equal
    /// dates the later observation wins.
    #[must_use]
    pub fn dedupe(observations: impl IntoIterator<Item = Observation>) -> Vec<Observation> {
        let mut latest: BTreeMap<(NaiveDate, String), Observation> = BTreeMap::new();
        for observation in observations {
            let key = (observation.period_end, observation.filing_type.clone());
            keep_latest(latest.entry(key), observation);
        }
        latest.into_values().collect()
    }

    /// Collapses observations to one per period end, keeping the most
    /// recently filed one whatever its filing type.
    ///
    /// This is what lets an amendment filed after the original report
    /// supersede it.
    #[must_use]
    pub fn latest_per_period(
        observations: impl IntoIterator<Item = Observation>,
    ) -> BTreeMap<NaiveDate, Observation> {
        let mut latest = BTreeMap::new();
        for observation in observations {
            keep_latest(latest.entry(observation.period_end), observation);
        }
        latest
    }
}

fn keep_latest<K: Ord>(entry: Entry<'_, K, Observation>, candidate: Observation) {
    match entry {
        Entry::Vacant(slot) => {
            slot.insert(candidate);
        }
        Entry::Occupied(mut slot) => {
            // `None < Some(_)`, so undated observations lose to dated ones.
            if candidate.filed_date >= slot.get().filed_date {
                slot.insert(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obs(value: f64, end: NaiveDate, form: &str) -> Observation {
        Observation::new("Revenues", value, "USD", end, form)
    }

    #[test]
    fn test_cadence_filter_forms() {
        let end = date(2020, 12, 31);
        let observations = vec![
            obs(1.0, end, "10-K"),
            obs(2.0, end, "10-Q"),
            obs(3.0, end, "10-K/A"),
        ];

        let annual: Vec<String> = FilingFilter::filter(observations.clone(), Cadence::Annual)
            .into_iter()
            .map(|o| o.filing_type)
            .collect();
        assert_eq!(annual, vec!["10-K", "10-K/A"]);

        let quarterly: Vec<String> = FilingFilter::filter(observations.clone(), Cadence::Quarterly)
            .into_iter()
            .map(|o| o.filing_type)
            .collect();
        assert_eq!(quarterly, vec!["10-Q"]);

        assert_eq!(FilingFilter::filter(observations, Cadence::Unfiltered).len(), 3);
    }

    #[test]
    fn test_dedupe_keeps_latest_filed() {
        let end = date(2020, 12, 31);
        let observations = vec![
            obs(110.0, end, "10-K").with_filed_date(date(2021, 6, 1)),
            obs(100.0, end, "10-K").with_filed_date(date(2021, 1, 1)),
        ];

        let kept = FilingFilter::filter(observations, Cadence::Annual);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].value, 110.0);
    }

    #[test]
    fn test_undated_observation_loses() {
        let end = date(2020, 12, 31);
        let kept = FilingFilter::dedupe(vec![
            obs(1.0, end, "10-K").with_filed_date(date(2021, 2, 1)),
            obs(2.0, end, "10-K"),
        ]);
        assert_eq!(kept[0].value, 1.0);

        // Equal dates: the later observation wins.
        let kept = FilingFilter::dedupe(vec![obs(1.0, end, "10-K"), obs(2.0, end, "10-K")]);
        assert_eq!(kept[0].value, 2.0);
    }

    #[test]
    fn test_span_check() {
        let end = date(2023, 12, 31);
        let full_year = obs(400.0, end, "10-K").with_period_start(date(2023, 1, 1));
        let fourth_quarter = obs(100.0, end, "10-K").with_period_start(date(2023, 10, 1));

        let kept = FilingFilter::filter(vec![full_year, fourth_quarter], Cadence::Annual);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].value, 400.0);

        let year_to_date = obs(300.0, date(2023, 9, 30), "10-Q").with_period_start(date(2023, 1, 1));
        let third_quarter = obs(100.0, date(2023, 9, 30), "10-Q").with_period_start(date(2023, 7, 1));
        let kept = FilingFilter::filter(vec![year_to_date, third_quarter], Cadence::Quarterly);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].value, 100.0);
    }

    #[test]
    fn test_amendment_supersedes_original() {
        let end = date(2020, 12, 31);
        let observations = FilingFilter::filter(
            vec![
                obs(100.0, end, "10-K").with_filed_date(date(2021, 2, 1)),
                obs(105.0, end, "10-K/A").with_filed_date(date(2021, 8, 1)),
            ],
            Cadence::Annual,
        );
        assert_eq!(observations.len(), 2);

        let collapsed = FilingFilter::latest_per_period(observations);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[&end].value, 105.0);
        assert_eq!(collapsed[&end].filing_type, "10-K/A");
    }
}
