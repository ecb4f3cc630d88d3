//! Metrics computed from other resolved concepts.
//!
//! A [`Metric`] never reads the fact document directly: it asks a
//! [`SeriesResolver`] for its inputs by name, so metrics can be built on top
//! of registry concepts and of other metrics alike.

use chrono::NaiveDate;
use fundamentals_core::{Cadence, ConceptSeries, FactsError};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::registry::concept::*;

/// Resolves a concept or metric name into a series.
pub trait SeriesResolver {
    /// Returns the series for `name` at `cadence`; empty when unresolvable.
    fn resolve(&self, name: &str, cadence: Cadence) -> ConceptSeries;
}

/// A metric derived arithmetically from other concepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Current liabilities minus non-debt current payables.
    ShortTermDebt,
    /// Long-term plus short-term debt.
    TotalDebt,
    /// Net income over revenue.
    ProfitMargin,
    /// Reported diluted EPS, else net income over diluted shares.
    EarningsPerShare,
    /// Assets minus equity.
    ImpliedLiabilities,
    /// Implied liabilities over assets.
    LiabilitiesToAssets,
    /// Current assets minus current liabilities.
    WorkingCapital,
    /// Assets minus current liabilities.
    CapitalEmployed,
    /// Net income over equity.
    ReturnOnEquity,
    /// Operating income over capital employed.
    ReturnOnCapitalEmployed,
    /// Operating cash flow minus capital expenditure.
    FreeCashFlow,
    /// Free cash flow over shares outstanding.
    FreeCashFlowPerShare,
    /// Operating income plus depreciation and amortization.
    Ebitda,
    /// Net income plus interest expense plus income taxes.
    Ebit,
    /// Dividend per share over earnings per share.
    DividendPayoutRatio,
    /// Net over gross property, plant and equipment.
    PropertyPlantAndEquipmentRatio,
    /// Cash and equivalents plus current marketable securities.
    CashAndMarketableSecurities,
}

impl Metric {
    /// Every metric, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::ShortTermDebt,
        Self::TotalDebt,
        Self::ProfitMargin,
        Self::EarningsPerShare,
        Self::ImpliedLiabilities,
        Self::LiabilitiesToAssets,
        Self::WorkingCapital,
        Self::CapitalEmployed,
        Self::ReturnOnEquity,
        Self::ReturnOnCapitalEmployed,
        Self::FreeCashFlow,
        Self::FreeCashFlowPerShare,
        Self::Ebitda,
        Self::Ebit,
        Self::DividendPayoutRatio,
        Self::PropertyPlantAndEquipmentRatio,
        Self::CashAndMarketableSecurities,
    ];

    /// Returns the name under which the metric is requested.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ShortTermDebt => "ShortTermDebt",
            Self::TotalDebt => "TotalDebt",
            Self::ProfitMargin => "ProfitMargin",
            Self::EarningsPerShare => "EarningsPerShare",
            Self::ImpliedLiabilities => "ImpliedLiabilities",
            Self::LiabilitiesToAssets => "LiabilitiesToAssets",
            Self::WorkingCapital => "WorkingCapital",
            Self::CapitalEmployed => "CapitalEmployed",
            Self::ReturnOnEquity => "ReturnOnEquity",
            Self::ReturnOnCapitalEmployed => "ReturnOnCapitalEmployed",
            Self::FreeCashFlow => "FreeCashFlow",
            Self::FreeCashFlowPerShare => "FreeCashFlowPerShare",
            Self::Ebitda => "Ebitda",
            Self::Ebit => "Ebit",
            Self::DividendPayoutRatio => "DividendPayoutRatio",
            Self::PropertyPlantAndEquipmentRatio => "PropertyPlantAndEquipmentRatio",
            Self::CashAndMarketableSecurities => "CashAndMarketableSecurities",
        }
    }

    /// Looks a metric up by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Computes the metric from series obtained through `resolver`.
    ///
    /// Periods where an input is missing, or where a ratio's denominator is
    /// zero, are left out of the result.
    #[must_use]
    pub fn compute(&self, resolver: &dyn SeriesResolver, cadence: Cadence) -> ConceptSeries {
        let get = |name: &str| resolver.resolve(name, cadence);
        let name = self.name();

        match self {
            Self::ShortTermDebt => {
                subtract_or_zero(name, &get(LIABILITIES_CURRENT), &get(SHORT_TERM_PAYABLES))
            }
            Self::TotalDebt => add(
                name,
                &get(LONG_TERM_DEBT),
                &get(Self::ShortTermDebt.name()),
            ),
            Self::ProfitMargin => ratio(name, &get(NET_INCOME_LOSS), &get(REVENUES)),
            Self::EarningsPerShare => {
                let reported = get(EARNINGS_PER_SHARE_DILUTED);
                if reported.is_empty() {
                    ratio(name, &get(NET_INCOME_LOSS), &get(DILUTED_SHARES_OUTSTANDING))
                } else {
                    reported.renamed(name)
                }
            }
            Self::ImpliedLiabilities => subtract(name, &get(ASSETS), &get(EQUITY)),
            Self::LiabilitiesToAssets => ratio(
                name,
                &get(Self::ImpliedLiabilities.name()),
                &get(ASSETS),
            ),
            Self::WorkingCapital => subtract(name, &get(ASSETS_CURRENT), &get(LIABILITIES_CURRENT)),
            Self::CapitalEmployed => subtract(name, &get(ASSETS), &get(LIABILITIES_CURRENT)),
            Self::ReturnOnEquity => ratio(name, &get(NET_INCOME_LOSS), &get(EQUITY)),
            Self::ReturnOnCapitalEmployed => ratio(
                name,
                &get(OPERATING_INCOME_LOSS),
                &get(Self::CapitalEmployed.name()),
            ),
            Self::FreeCashFlow => {
                subtract(name, &get(CASH_FROM_OPERATING_ACTIVITIES), &get(CAPEX))
            }
            Self::FreeCashFlowPerShare => ratio(
                name,
                &get(Self::FreeCashFlow.name()),
                &get(COMMON_STOCK_SHARES_OUTSTANDING),
            ),
            Self::Ebitda => add(
                name,
                &get(OPERATING_INCOME_LOSS),
                &get(DEPRECIATION_AND_AMORTIZATION),
            ),
            Self::Ebit => sum_present(
                name,
                &[
                    get(NET_INCOME_LOSS),
                    get(INTEREST_EXPENSE),
                    get(INCOME_TAX_EXPENSE),
                ],
            ),
            Self::DividendPayoutRatio => ratio(
                name,
                &get(DIVIDEND_PER_SHARE),
                &get(Self::EarningsPerShare.name()),
            ),
            Self::PropertyPlantAndEquipmentRatio => ratio(
                name,
                &get(PROPERTY_PLANT_AND_EQUIPMENT_NET),
                &get(PROPERTY_PLANT_AND_EQUIPMENT_GROSS),
            ),
            Self::CashAndMarketableSecurities => add(
                name,
                &get(CASH_AND_CASH_EQUIVALENTS),
                &get(MARKETABLE_SECURITIES_CURRENT),
            ),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = FactsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| FactsError::InvalidParameter(format!("unknown metric '{s}'")))
    }
}

/// Applies `f` on periods where both inputs have a value.
fn zip_with(
    name: &str,
    a: &ConceptSeries,
    b: &ConceptSeries,
    f: impl Fn(f64, f64) -> Option<f64>,
) -> ConceptSeries {
    let values = a
        .iter()
        .filter_map(|(end, x)| b.get(end).and_then(|y| f(x, y)).map(|v| (end, v)));
    ConceptSeries::from_values(name, a.cadence(), values)
}

fn add(name: &str, a: &ConceptSeries, b: &ConceptSeries) -> ConceptSeries {
    zip_with(name, a, b, |x, y| Some(x + y))
}

fn subtract(name: &str, a: &ConceptSeries, b: &ConceptSeries) -> ConceptSeries {
    zip_with(name, a, b, |x, y| Some(x - y))
}

/// `a / b`, leaving out periods where `b` is zero.
fn ratio(name: &str, a: &ConceptSeries, b: &ConceptSeries) -> ConceptSeries {
    zip_with(name, a, b, |x, y| (y != 0.0).then(|| x / y))
}

/// `a - b` on every period of `a`, with a missing `b` counting as zero.
fn subtract_or_zero(name: &str, a: &ConceptSeries, b: &ConceptSeries) -> ConceptSeries {
    let values = a.iter().map(|(end, x)| (end, x - b.get(end).unwrap_or(0.0)));
    ConceptSeries::from_values(name, a.cadence(), values)
}

/// Sum over the inputs present at each period; a period needs at least one.
fn sum_present(name: &str, inputs: &[ConceptSeries]) -> ConceptSeries {
    let cadence = inputs.first().map_or(Cadence::default(), ConceptSeries::cadence);
    let periods: BTreeSet<NaiveDate> = inputs.iter().flat_map(|s| s.periods()).collect();
    let values = periods
        .into_iter()
        .map(|end| (end, inputs.iter().filter_map(|s| s.get(end)).sum()));
    ConceptSeries::from_values(name, cadence, values)
}
