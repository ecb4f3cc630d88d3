//! The reconciliation pipeline over one fact document.
//!
//! ```text
//! concept ─► ConceptRegistry ─► tags
//!   tag ─► RawSeriesExtractor ─► FilingFilter ─► SynonymSeries
//!   SynonymSeries* ─► ConceptCoalescer (pick one / sum) ─► ConceptSeries
//!   ConceptSeries* ─► FinancialTable
//! ```
//!
//! Everything here is a pure in-memory transformation of an already
//! fetched document.

use fundamentals_core::{Cadence, ConceptSeries, FactDocument, FinancialTable};
use tracing::{debug, instrument};

use crate::coalesce::{ConceptCoalescer, SynonymSeries};
use crate::derived::{Metric, SeriesResolver};
use crate::extract::RawSeriesExtractor;
use crate::filter::FilingFilter;
use crate::registry::{ConceptKind, ConceptRegistry};

/// Resolves concepts, metrics and raw tags against one document.
///
/// Name resolution order: a registered concept, then a [`Metric`], then the
/// name taken as a raw tag.
#[derive(Debug)]
pub struct Reconciler<'a> {
    document: &'a FactDocument,
    registry: &'a ConceptRegistry,
    extractor: RawSeriesExtractor,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler using the global registry and default units.
    #[must_use]
    pub fn new(document: &'a FactDocument) -> Self {
        Self::with_registry(document, ConceptRegistry::global())
    }

    /// Creates a reconciler over a custom registry.
    #[must_use]
    pub fn with_registry(document: &'a FactDocument, registry: &'a ConceptRegistry) -> Self {
        Self {
            document,
            registry,
            extractor: RawSeriesExtractor::default(),
        }
    }

    /// Replaces the unit extractor (e.g. to prefer `EUR`).
    #[must_use]
    pub fn with_extractor(mut self, extractor: RawSeriesExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Extracts, filters and collapses the observations of a single tag.
    #[must_use]
    pub fn synonym_series(&self, tag: &str, cadence: Cadence) -> SynonymSeries {
        let observations = self.extractor.extract(self.document, tag);
        let filtered = FilingFilter::filter(observations, cadence);
        SynonymSeries::from_observations(tag, filtered)
    }

    /// Resolves `name` into a series.
    ///
    /// An unresolvable name yields an empty series.
    #[instrument(skip_all, fields(concept = %name, %cadence))]
    pub fn series(&self, name: &str, cadence: Cadence) -> ConceptSeries {
        let coalescer = ConceptCoalescer::new(self.registry);

        if let Some(definition) = self.registry.get(name) {
            let tags = definition.tags();
            let per_tag: Vec<SynonymSeries> = tags
                .iter()
                .map(|tag| self.synonym_series(tag, cadence))
                .filter(|s| !s.is_empty())
                .collect();

            if per_tag.is_empty() {
                debug!("No synonym present in document");
            }

            return match definition.kind {
                ConceptKind::Synonyms => coalescer.coalesce(name, cadence, &per_tag, &tags),
                ConceptKind::Sum => coalescer.aggregate(name, cadence, &per_tag),
            };
        }

        if let Some(metric) = Metric::from_name(name) {
            return metric.compute(self, cadence);
        }

        let tags = self.registry.synonyms_for(name);
        let raw = self.synonym_series(name, cadence);
        coalescer.coalesce(name, cadence, &[raw], &tags)
    }

    /// Builds a table with one column per name in `concepts`.
    ///
    /// Names are resolved like [`Reconciler::series`]; a repeated name
    /// yields one column.
    #[must_use]
    pub fn table(&self, concepts: &[&str], cadence: Cadence) -> FinancialTable {
        let table = FinancialTable::from_series(
            cadence,
            concepts.iter().map(|name| self.series(name, cadence)),
        );
        debug!(
            columns = table.width(),
            rows = table.height(),
            %cadence,
            "Assembled financial table"
        );
        table
    }
}

impl SeriesResolver for Reconciler<'_> {
    fn resolve(&self, name: &str, cadence: Cadence) -> ConceptSeries {
        self.series(name, cadence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::concept::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn document() -> FactDocument {
        FactDocument::from_value(&json!({
            "facts": {
                "us-gaap": {
                    "Revenues": {"units": {"USD": [
                        {"start": "2021-01-01", "end": "2021-12-31", "val": 90.0, "form": "10-K", "filed": "2022-02-01"},
                        {"start": "2021-10-01", "end": "2021-12-31", "val": 25.0, "form": "10-K", "filed": "2022-02-01"}
                    ]}},
                    "RevenueFromContractWithCustomerExcludingAssessedTax": {"units": {"USD": [
                        {"start": "2021-01-01", "end": "2021-12-31", "val": 91.0, "form": "10-K", "filed": "2022-02-01"},
                        {"start": "2022-01-01", "end": "2022-12-31", "val": 100.0, "form": "10-K", "filed": "2023-02-01"},
                        {"start": "2022-01-01", "end": "2022-12-31", "val": 104.0, "form": "10-K/A", "filed": "2023-06-01"},
                        {"start": "2023-01-01", "end": "2023-03-31", "val": 30.0, "form": "10-Q", "filed": "2023-05-01"}
                    ]}},
                    "NetIncomeLoss": {"units": {"USD": [
                        {"start": "2022-01-01", "end": "2022-12-31", "val": 10.4, "form": "10-K", "filed": "2023-02-01"}
                    ]}},
                    "PaymentsToAcquirePropertyPlantAndEquipment": {"units": {"USD": [
                        {"start": "2022-01-01", "end": "2022-12-31", "val": 10.0, "form": "10-K"}
                    ]}},
                    "PaymentsToAcquireProductiveAssets": {"units": {"USD": [
                        {"start": "2022-01-01", "end": "2022-12-31", "val": 5.0, "form": "10-K"}
                    ]}},
                    "InventoryNet": {"units": {"USD": [
                        {"end": "2022-12-31", "val": 7.0, "form": "10-K"}
                    ]}}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_concept_pipeline() {
        let doc = document();
        let revenues = Reconciler::new(&doc).series(REVENUES, Cadence::Annual);

        // 2021 comes from the canonical tag, 2022 from the synonym's amendment.
        assert_eq!(revenues.len(), 2);
        assert_eq!(revenues.get(date(2021, 12, 31)), Some(90.0));
        assert_eq!(revenues.get(date(2022, 12, 31)), Some(104.0));
        assert_eq!(revenues.points()[0].source.as_deref(), Some("Revenues"));
    }

    #[test]
    fn test_quarterly_cadence() {
        let doc = document();
        let revenues = Reconciler::new(&doc).series(REVENUES, Cadence::Quarterly);
        assert_eq!(revenues.values(), vec![30.0]);
    }

    #[test]
    fn test_sum_concept() {
        let doc = document();
        let capex = Reconciler::new(&doc).series(CAPEX, Cadence::Annual);
        assert_eq!(capex.get(date(2022, 12, 31)), Some(15.0));
    }

    #[test]
    fn test_metric_and_raw_tag() {
        let doc = document();
        let reconciler = Reconciler::new(&doc);

        let margin = reconciler.series("ProfitMargin", Cadence::Annual);
        assert_eq!(margin.len(), 1);
        assert!((margin.get(date(2022, 12, 31)).unwrap() - 0.1).abs() < 1e-12);

        let inventory = reconciler.series("InventoryNet", Cadence::Annual);
        assert_eq!(inventory.values(), vec![7.0]);
    }

    #[test]
    fn test_table_tolerates_missing_concepts() {
        let doc = document();
        let table = Reconciler::new(&doc).table(&[REVENUES, ASSETS, REVENUES], Cadence::Annual);

        assert_eq!(table.column_names().collect::<Vec<_>>(), vec![REVENUES, ASSETS]);
        assert_eq!(table.height(), 2);
        assert!(table.column(ASSETS).unwrap().iter().all(Option::is_none));
    }

    #[test]
    fn test_empty_document() {
        let doc = FactDocument::empty();
        let table = Reconciler::new(&doc).table(&[REVENUES, "Ebit"], Cadence::Annual);
        assert_eq!(table.width(), 2);
        assert!(table.is_empty());
    }
}
