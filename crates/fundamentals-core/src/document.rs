//! Tagged-fact documents as returned by a [`FactSource`](crate::source::FactSource).
//!
//! The document shape follows the EDGAR company facts payload:
//!
//! ```text
//! { "facts": { taxonomy: { tag: { "units": { unit: [record, ...] } } } } }
//! ```
//!
//! Structural problems (no `facts` key, a non-object where an object is
//! expected) make the whole document malformed. Individual records that
//! cannot be decoded are skipped.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::error::{FactsError, Result};
use crate::types::Observation;

/// Taxonomies holding entity-level descriptive facts rather than
/// financial magnitudes. They are only consulted as a fallback.
pub const AUXILIARY_TAXONOMIES: &[&str] = &["dei", "srt", "invest"];

/// Date format used by the company facts API.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A raw observation record as it appears in the document.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawFact {
    /// End date of the period.
    pub end: String,
    /// Reported value.
    #[serde(default)]
    pub val: Option<f64>,
    /// Start date for duration facts.
    #[serde(default)]
    pub start: Option<String>,
    /// Accession number.
    #[serde(default)]
    pub accn: Option<String>,
    /// Fiscal year.
    #[serde(default)]
    pub fy: Option<i32>,
    /// Fiscal period.
    #[serde(default)]
    pub fp: Option<String>,
    /// Form type.
    #[serde(default)]
    pub form: Option<String>,
    /// Filed date.
    #[serde(default)]
    pub filed: Option<String>,
    /// Calendar frame (e.g. `CY2023Q1I`).
    #[serde(default)]
    pub frame: Option<String>,
}

impl RawFact {
    /// Converts the record into an [`Observation`] for `tag` in `unit`.
    ///
    /// Returns `None` when the value is absent or not finite, or when the
    /// end date cannot be parsed. Unparsable optional dates are dropped.
    #[must_use]
    pub fn to_observation(&self, tag: &str, unit: &str) -> Option<Observation> {
        let value = self.val.filter(|v| v.is_finite())?;
        let period_end = parse_date(&self.end)?;

        Some(Observation {
            tag: tag.to_string(),
            value,
            unit: unit.to_string(),
            period_end,
            period_start: self.start.as_deref().and_then(parse_date),
            filing_type: self.form.clone().unwrap_or_default(),
            filed_date: self.filed.as_deref().and_then(parse_date),
            accession_id: self.accn.clone().unwrap_or_default(),
            fiscal_year: self.fy,
            fiscal_period: self.fp.clone(),
        })
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Records reported for one tag in one unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnitFacts {
    /// Unit name, e.g. `USD`, `shares`, `USD/shares`.
    pub unit: String,
    /// Decoded records in document order.
    pub records: Vec<RawFact>,
}

/// All facts for one tag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagFacts {
    /// Human readable label.
    pub label: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Units in the order they appear in the document.
    pub units: Vec<UnitFacts>,
}

impl TagFacts {
    /// Returns the records for `unit`, if present.
    #[must_use]
    pub fn unit(&self, unit: &str) -> Option<&UnitFacts> {
        self.units.iter().find(|u| u.unit == unit)
    }
}

/// One taxonomy (e.g. `us-gaap`, `ifrs-full`, `dei`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Taxonomy {
    name: String,
    tags: HashMap<String, TagFacts>,
}

impl Taxonomy {
    /// Creates an empty taxonomy.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: HashMap::new(),
        }
    }

    /// Returns the taxonomy name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true for taxonomies listed in [`AUXILIARY_TAXONOMIES`].
    #[must_use]
    pub fn is_auxiliary(&self) -> bool {
        AUXILIARY_TAXONOMIES.contains(&self.name.as_str())
    }

    /// Returns the facts for `tag`.
    #[must_use]
    pub fn tag(&self, tag: &str) -> Option<&TagFacts> {
        self.tags.get(tag)
    }

    /// Returns the number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if the taxonomy has no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns the tag names (unordered).
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }
}

/// An entity's complete tagged-fact document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FactDocument {
    entity_name: Option<String>,
    cik: Option<u64>,
    taxonomies: Vec<Taxonomy>,
}

impl FactDocument {
    /// Creates a document with no facts.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a document from JSON text.
    ///
    /// # Errors
    /// Returns [`FactsError::Parse`] for invalid JSON and
    /// [`FactsError::MalformedDocument`] for an unexpected structure.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| FactsError::Parse(format!("Failed to parse company facts: {e}")))?;
        Self::from_value(&value)
    }

    /// Builds a document from an already decoded JSON value.
    ///
    /// # Errors
    /// Returns [`FactsError::MalformedDocument`] when `facts` is missing or
    /// any level of the taxonomy → tag → units → records nesting has the
    /// wrong JSON type.
    pub fn from_value(value: &Value) -> Result<Self> {
        let root = as_object(value, "document root")?;
        let facts = root
            .get("facts")
            .ok_or_else(|| FactsError::MalformedDocument("missing 'facts' key".to_string()))?;
        let facts = as_object(facts, "facts")?;

        let mut taxonomies = Vec::with_capacity(facts.len());
        for (taxonomy_name, tags) in facts {
            let tags = as_object(tags, taxonomy_name)?;
            let mut taxonomy = Taxonomy::new(taxonomy_name);
            for (tag_name, tag_value) in tags {
                let tag = parse_tag(taxonomy_name, tag_name, tag_value)?;
                taxonomy.tags.insert(tag_name.clone(), tag);
            }
            debug!(
                taxonomy = %taxonomy_name,
                tags = taxonomy.len(),
                "Parsed taxonomy"
            );
            taxonomies.push(taxonomy);
        }

        Ok(Self {
            entity_name: root
                .get("entityName")
                .and_then(Value::as_str)
                .map(str::to_string),
            cik: root.get("cik").and_then(Value::as_u64),
            taxonomies,
        })
    }

    /// Returns the entity name, if the document carries one.
    #[must_use]
    pub fn entity_name(&self) -> Option<&str> {
        self.entity_name.as_deref()
    }

    /// Returns the CIK recorded in the document, if any.
    #[must_use]
    pub const fn cik(&self) -> Option<u64> {
        self.cik
    }

    /// Returns the taxonomies in document order.
    #[must_use]
    pub fn taxonomies(&self) -> &[Taxonomy] {
        &self.taxonomies
    }

    /// Returns a taxonomy by name.
    #[must_use]
    pub fn taxonomy(&self, name: &str) -> Option<&Taxonomy> {
        self.taxonomies.iter().find(|t| t.name == name)
    }

    /// Returns the non-auxiliary taxonomies in document order.
    pub fn financial_taxonomies(&self) -> impl Iterator<Item = &Taxonomy> {
        self.taxonomies.iter().filter(|t| !t.is_auxiliary())
    }

    /// Returns true if the document has no taxonomies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.taxonomies.iter().all(Taxonomy::is_empty)
    }

    /// Adds a tag with its units, creating the taxonomy if needed.
    ///
    /// Intended for building documents in memory (tests, adapters).
    #[must_use]
    pub fn with_tag(mut self, taxonomy: &str, tag: &str, facts: TagFacts) -> Self {
        let index = match self.taxonomies.iter().position(|t| t.name == taxonomy) {
            Some(i) => i,
            None => {
                self.taxonomies.push(Taxonomy::new(taxonomy));
                self.taxonomies.len() - 1
            }
        };
        self.taxonomies[index].tags.insert(tag.to_string(), facts);
        self
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| FactsError::MalformedDocument(format!("'{what}' is not a mapping")))
}

fn parse_tag(taxonomy: &str, tag: &str, value: &Value) -> Result<TagFacts> {
    let path = format!("{taxonomy}.{tag}");
    let object = as_object(value, &path)?;

    let mut facts = TagFacts {
        label: object.get("label").and_then(Value::as_str).map(str::to_string),
        description: object
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        units: Vec::new(),
    };

    let Some(units) = object.get("units") else {
        return Ok(facts);
    };
    for (unit, records) in as_object(units, &format!("{path}.units"))? {
        let records = records.as_array().ok_or_else(|| {
            FactsError::MalformedDocument(format!("'{path}.units.{unit}' is not a list"))
        })?;
        let decoded = records
            .iter()
            .filter_map(|record| match RawFact::deserialize(record) {
                Ok(fact) => Some(fact),
                Err(e) => {
                    trace!(tag = %path, unit = %unit, error = %e, "Skipping undecodable record");
                    None
                }
            })
            .collect();
        facts.units.push(UnitFacts {
            unit: unit.clone(),
            records: decoded,
        });
    }

    Ok(facts)
}
