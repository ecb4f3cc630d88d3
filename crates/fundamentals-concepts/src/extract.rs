//! Raw observation extraction from a fact document.
//!
//! The extractor looks a tag up across taxonomies and flattens the records of
//! exactly one unit into [`Observation`]s. A tag that is absent is not an
//! error: the result is simply empty.

use fundamentals_core::{FactDocument, Observation, TagFacts, Taxonomy, UnitFacts};
use tracing::{debug, trace, warn};

/// Unit preferred when nothing else is configured.
pub const DEFAULT_PREFERRED_UNITS: &[&str] = &["USD"];

/// Unit name used for share counts.
const SHARES_UNIT: &str = "shares";

/// How the unit of an extracted series was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitChoice {
    /// The tag reports a single unit.
    Only,
    /// A unit from the preferred list.
    Preferred,
    /// A currency code other than the preferred ones.
    Monetary,
    /// The share-count unit.
    Shares,
    /// None of the above; the first unit in the document was taken.
    FirstEncountered,
}

/// Observations for one tag in one unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedSeries {
    /// Taxonomy the tag was found in.
    pub taxonomy: Option<String>,
    /// Chosen unit, if the tag was found.
    pub unit: Option<String>,
    /// How the unit was chosen.
    pub choice: Option<UnitChoice>,
    /// Observations in document order.
    pub observations: Vec<Observation>,
}

impl ExtractedSeries {
    /// Returns true if nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Extracts flat observation lists from fact documents.
#[derive(Clone, Debug)]
pub struct RawSeriesExtractor {
    preferred_units: Vec<String>,
}

impl Default for RawSeriesExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_PREFERRED_UNITS.iter().copied())
    }
}

impl RawSeriesExtractor {
    /// Creates an extractor preferring `units` in order.
    #[must_use]
    pub fn new<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preferred_units: units.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the preferred units in order.
    #[must_use]
    pub fn preferred_units(&self) -> &[String] {
        &self.preferred_units
    }

    /// Extracts the observations reported under `tag`.
    #[must_use]
    pub fn extract(&self, document: &FactDocument, tag: &str) -> Vec<Observation> {
        self.extract_with_unit(document, tag).observations
    }

    /// Extracts the observations reported under `tag`, along with the
    /// taxonomy and unit they were taken from.
    ///
    /// Financial taxonomies are searched first, in document order; auxiliary
    /// taxonomies are only consulted when none of them has the tag.
    #[must_use]
    pub fn extract_with_unit(&self, document: &FactDocument, tag: &str) -> ExtractedSeries {
        let Some((taxonomy, facts)) = find_tag(document, tag) else {
            trace!(tag = %tag, "Tag not present in document");
            return ExtractedSeries::default();
        };

        let Some((units, choice)) = self.select_unit(&facts.units) else {
            return ExtractedSeries::default();
        };

        if choice == UnitChoice::FirstEncountered {
            warn!(
                tag = %tag,
                unit = %units.unit,
                candidates = facts.units.len(),
                "No preferred unit, using first unit encountered"
            );
        }

        let observations: Vec<Observation> = units
            .records
            .iter()
            .filter_map(|record| {
                let observation = record.to_observation(tag, &units.unit);
                if observation.is_none() {
                    trace!(tag = %tag, end = %record.end, "Skipping record without usable value");
                }
                observation
            })
            .collect();

        debug!(
            tag = %tag,
            taxonomy = %taxonomy.name(),
            unit = %units.unit,
            count = observations.len(),
            "Extracted observations"
        );

        ExtractedSeries {
            taxonomy: Some(taxonomy.name().to_string()),
            unit: Some(units.unit.clone()),
            choice: Some(choice),
            observations,
        }
    }

    /// Picks exactly one unit among those with records.
    fn select_unit<'a>(&self, units: &'a [UnitFacts]) -> Option<(&'a UnitFacts, UnitChoice)> {
        let candidates: Vec<&UnitFacts> = units.iter().filter(|u| !u.records.is_empty()).collect();

        match candidates.as_slice() {
            [] => None,
            [only] => Some((*only, UnitChoice::Only)),
            _ => self
                .preferred_units
                .iter()
                .find_map(|p| candidates.iter().find(|u| &u.unit == p))
                .map(|u| (*u, UnitChoice::Preferred))
                .or_else(|| {
                    candidates
                        .iter()
                        .find(|u| is_currency(&u.unit))
                        .map(|u| (*u, UnitChoice::Monetary))
                })
                .or_else(|| {
                    candidates
                        .iter()
                        .find(|u| u.unit == SHARES_UNIT)
                        .map(|u| (*u, UnitChoice::Shares))
                })
                .or_else(|| candidates.first().map(|u| (*u, UnitChoice::FirstEncountered))),
        }
    }
}

/// Ordered taxonomy search returning the first taxonomy holding records for
/// `tag`.
fn find_tag<'a>(document: &'a FactDocument, tag: &str) -> Option<(&'a Taxonomy, &'a TagFacts)> {
    let has_records =
        |facts: &&TagFacts| facts.units.iter().any(|u| !u.records.is_empty());

    let financial = document.financial_taxonomies();
    let auxiliary = document.taxonomies().iter().filter(|t| t.is_auxiliary());

    financial
        .chain(auxiliary)
        .find_map(|taxonomy| taxonomy.tag(tag).filter(has_records).map(|f| (taxonomy, f)))
}

/// ISO 4217 style currency code: three uppercase ASCII letters.
fn is_currency(unit: &str) -> bool {
    unit.len() == 3 && unit.bytes().all(|b| b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> FactDocument {
        FactDocument::from_value(&json!({
            "facts": {
                "dei": {
                    "EntityPublicFloat": {"units": {"USD": [
                        {"end": "2023-06-30", "val": 2.5e12, "form": "10-K", "filed": "2023-11-03"}
                    ]}},
                    "Revenues": {"units": {"USD": [
                        {"end": "2023-12-31", "val": 1.0, "form": "10-K"}
                    ]}}
                },
                "ifrs-full": {
                    "Revenue": {"units": {
                        "EUR": [{"end": "2023-12-31", "val": 90.0, "form": "20-F"}],
                        "shares": [{"end": "2023-12-31", "val": 7.0, "form": "20-F"}]
                    }},
                    "Dividends": {"units": {
                        "pure": [{"end": "2023-12-31", "val": 0.5, "form": "20-F"}],
                        "EUR/shares": [{"end": "2023-12-31", "val": 1.5, "form": "20-F"}]
                    }}
                },
                "us-gaap": {
                    "Revenues": {"units": {
                        "shares": [{"end": "2023-12-31", "val": 3.0, "form": "10-K"}],
                        "USD": [
                            {"end": "2023-12-31", "val": 100.0, "form": "10-K"},
                            {"end": "2022-12-31", "form": "10-K"}
                        ]
                    }},
                    "Empty": {"units": {"USD": []}}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_prefers_usd() {
        let extracted = RawSeriesExtractor::default().extract_with_unit(&document(), "Revenues");
        assert_eq!(extracted.taxonomy.as_deref(), Some("us-gaap"));
        assert_eq!(extracted.unit.as_deref(), Some("USD"));
        assert_eq!(extracted.choice, Some(UnitChoice::Preferred));
        // The record without a value is skipped.
        assert_eq!(extracted.observations.len(), 1);
        assert!(extracted.observations.iter().all(|o| o.unit == "USD"));
    }

    #[test]
    fn test_other_currency_before_shares() {
        let extracted = RawSeriesExtractor::default().extract_with_unit(&document(), "Revenue");
        assert_eq!(extracted.unit.as_deref(), Some("EUR"));
        assert_eq!(extracted.choice, Some(UnitChoice::Monetary));
        assert_eq!(extracted.observations[0].value, 90.0);
    }

    #[test]
    fn test_first_unit_fallback() {
        let extracted = RawSeriesExtractor::default().extract_with_unit(&document(), "Dividends");
        assert_eq!(extracted.unit.as_deref(), Some("pure"));
        assert_eq!(extracted.choice, Some(UnitChoice::FirstEncountered));
    }

    #[test]
    fn test_custom_preference() {
        let extractor = RawSeriesExtractor::new(["EUR/shares"]);
        let extracted = extractor.extract_with_unit(&document(), "Dividends");
        assert_eq!(extracted.unit.as_deref(), Some("EUR/shares"));
    }

    #[test]
    fn test_auxiliary_taxonomy_is_fallback_only() {
        let extractor = RawSeriesExtractor::default();
        let public_float = extractor.extract_with_unit(&document(), "EntityPublicFloat");
        assert_eq!(public_float.taxonomy.as_deref(), Some("dei"));
        assert_eq!(public_float.observations.len(), 1);

        // Present in both dei and us-gaap: the financial taxonomy wins.
        let revenues = extractor.extract(&document(), "Revenues");
        assert_eq!(revenues[0].value, 100.0);
    }

    #[test]
    fn test_missing_tag_is_empty() {
        let extractor = RawSeriesExtractor::default();
        assert!(extractor.extract(&document(), "Goodwill").is_empty());
        assert!(extractor.extract(&document(), "Empty").is_empty());
        assert!(extractor.extract(&FactDocument::empty(), "Revenues").is_empty());
    }
}
