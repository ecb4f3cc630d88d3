//! Static catalog of canonical concepts and their synonym tags.
//!
//! Different filers tag the same line item with different XBRL elements.
//! Each [`ConceptDefinition`] lists the tags known to carry a concept, in
//! preference order.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use concept::*;

/// Canonical concept names known to the registry.
pub mod concept {
    /// Total assets.
    pub const ASSETS: &str = "Assets";
    /// Current assets.
    pub const ASSETS_CURRENT: &str = "AssetsCurrent";
    /// Capital expenditure, summed from distinct payment line items.
    pub const CAPEX: &str = "Capex";
    /// Cash and cash equivalents.
    pub const CASH_AND_CASH_EQUIVALENTS: &str = "CashAndCashEquivalents";
    /// Net cash from operating activities.
    pub const CASH_FROM_OPERATING_ACTIVITIES: &str = "CashFromOperatingActivities";
    /// Net cash from financing activities.
    pub const CASH_FLOW_FROM_FINANCING_ACTIVITIES: &str = "CashFlowFromFinancingActivities";
    /// Net cash from investing activities.
    pub const CASH_FLOW_FROM_INVESTING_ACTIVITIES: &str = "CashFlowFromInvestingActivities";
    /// Common shares outstanding.
    pub const COMMON_STOCK_SHARES_OUTSTANDING: &str = "CommonStockSharesOutstanding";
    /// Cost of goods and services sold.
    pub const COST_OF_GOODS_AND_SERVICES_SOLD: &str = "CostOfGoodsAndServicesSold";
    /// Weighted average interest rate on debt.
    pub const DEBT_INTEREST_RATE: &str = "DebtInterestRate";
    /// Repayments of long-term debt.
    pub const DEBT_REPAYMENT: &str = "DebtRepayment";
    /// Depreciation and amortization.
    pub const DEPRECIATION_AND_AMORTIZATION: &str = "DepreciationAndAmortization";
    /// Weighted average diluted shares outstanding.
    pub const DILUTED_SHARES_OUTSTANDING: &str = "DilutedSharesOutstanding";
    /// Dividends declared or paid per share.
    pub const DIVIDEND_PER_SHARE: &str = "DividendPerShare";
    /// Diluted earnings per share as reported.
    pub const EARNINGS_PER_SHARE_DILUTED: &str = "EarningsPerShareDiluted";
    /// Effective income tax rate.
    pub const EFFECTIVE_INCOME_TAX_RATE: &str = "EffectiveIncomeTaxRate";
    /// Public float reported on the cover page.
    pub const ENTITY_PUBLIC_FLOAT: &str = "EntityPublicFloat";
    /// Shareholders' equity.
    pub const EQUITY: &str = "Equity";
    /// Gross profit.
    pub const GROSS_PROFIT: &str = "GrossProfit";
    /// Income tax expense.
    pub const INCOME_TAX_EXPENSE: &str = "IncomeTaxExpense";
    /// Interest expense.
    pub const INTEREST_EXPENSE: &str = "InterestExpense";
    /// Current liabilities.
    pub const LIABILITIES_CURRENT: &str = "LiabilitiesCurrent";
    /// Long-term debt.
    pub const LONG_TERM_DEBT: &str = "LongTermDebt";
    /// Current marketable securities.
    pub const MARKETABLE_SECURITIES_CURRENT: &str = "MarketableSecuritiesCurrent";
    /// Net income.
    pub const NET_INCOME_LOSS: &str = "NetIncomeLoss";
    /// Operating income.
    pub const OPERATING_INCOME_LOSS: &str = "OperatingIncomeLoss";
    /// Dividends paid in cash.
    pub const PAYMENTS_OF_DIVIDENDS: &str = "PaymentsOfDividends";
    /// Gross property, plant and equipment.
    pub const PROPERTY_PLANT_AND_EQUIPMENT_GROSS: &str = "PropertyPlantAndEquipmentGross";
    /// Net property, plant and equipment.
    pub const PROPERTY_PLANT_AND_EQUIPMENT_NET: &str = "PropertyPlantAndEquipmentNet";
    /// Revenue.
    pub const REVENUES: &str = "Revenues";
    /// Non-debt current liabilities, summed from distinct line items.
    pub const SHORT_TERM_PAYABLES: &str = "ShortTermPayables";
}

/// How the tags of a concept combine into one value per period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConceptKind {
    /// Tags are alternative labels for the same fact: exactly one is chosen.
    Synonyms,
    /// Tags are distinct line items: their values are summed.
    Sum,
}

/// A canonical concept with its ordered tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConceptDefinition {
    /// Canonical concept name.
    pub name: &'static str,
    /// Distinguished tag scanned before every synonym, if any.
    pub canonical_tag: Option<&'static str>,
    /// Synonym tags in preference order.
    pub synonyms: &'static [&'static str],
    /// Combination rule.
    pub kind: ConceptKind,
}

impl ConceptDefinition {
    const fn synonyms(
        name: &'static str,
        canonical_tag: Option<&'static str>,
        synonyms: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            canonical_tag,
            synonyms,
            kind: ConceptKind::Synonyms,
        }
    }

    const fn sum(name: &'static str, items: &'static [&'static str]) -> Self {
        Self {
            name,
            canonical_tag: None,
            synonyms: items,
            kind: ConceptKind::Sum,
        }
    }

    /// Returns every tag in priority order: the canonical tag first, then
    /// the synonyms, without duplicates.
    #[must_use]
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = Vec::with_capacity(self.synonyms.len() + 1);
        for tag in self.canonical_tag.iter().chain(self.synonyms) {
            if !tags.contains(tag) {
                tags.push(*tag);
            }
        }
        tags
    }
}

static DEFINITIONS: &[ConceptDefinition] = &[
    ConceptDefinition::synonyms(ASSETS, Some("Assets"), &[]),
    ConceptDefinition::synonyms(ASSETS_CURRENT, Some("AssetsCurrent"), &[]),
    ConceptDefinition::sum(
        CAPEX,
        &[
            "PaymentsToAcquirePropertyPlantAndEquipment",
            "PaymentsToAcquireOtherPropertyPlantAndEquipment",
            "PurchaseOfPropertyPlantAndEquipmentClassifiedAsInvestingActivities",
            "PaymentsToAcquireRealEstateHeldForInvestment",
            "PaymentsToDevelopRealEstateAssets",
            "PaymentsForCapitalImprovements",
            "PaymentsToAcquireAndDevelopRealEstate",
            "PaymentsToAcquireRealEstate",
            "PaymentsToAcquireCommercialRealEstate",
            "PaymentsToAcquireProductiveAssets",
            "PurchaseOfPropertyPlantAndEquipmentIntangibleAssetsOtherThanGoodwillInvestmentPropertyAndOtherNoncurrentAssets",
            "PurchaseOfPropertyPlantAndEquipmentAndIntangibleAssets",
            "PurchasesOfPropertyAndEquipmentAndIntangibleAssets",
        ],
    ),
    ConceptDefinition::synonyms(
        CASH_AND_CASH_EQUIVALENTS,
        Some("CashAndCashEquivalentsAtCarryingValue"),
        &[
            "CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalents",
            "CashAndCashEquivalents",
        ],
    ),
    ConceptDefinition::synonyms(
        CASH_FROM_OPERATING_ACTIVITIES,
        None,
        &[
            "NetCashProvidedByUsedInOperatingActivitiesContinuingOperations",
            "NetCashProvidedByUsedInOperatingActivities",
            "CashFlowsFromUsedInOperatingActivities",
        ],
    ),
    ConceptDefinition::synonyms(
        CASH_FLOW_FROM_FINANCING_ACTIVITIES,
        None,
        &[
            "NetCashProvidedByUsedInFinancingActivitiesContinuingOperations",
            "NetCashProvidedByUsedInFinancingActivities",
            "CashFlowsFromUsedInFinancingActivities",
        ],
    ),
    ConceptDefinition::synonyms(
        CASH_FLOW_FROM_INVESTING_ACTIVITIES,
        None,
        &[
            "NetCashProvidedByUsedInInvestingActivitiesContinuingOperations",
            "NetCashProvidedByUsedInInvestingActivities",
            "CashFlowsFromUsedInInvestingActivities",
        ],
    ),
    ConceptDefinition::synonyms(
        COMMON_STOCK_SHARES_OUTSTANDING,
        Some("CommonStockSharesOutstanding"),
        &[
            "WeightedAverageNumberOfDilutedSharesOutstanding",
            "CommonStockSharesIssued",
            "EntityCommonStockSharesOutstanding",
            "NumberOfSharesOutstanding",
            "NumberOfSharesIssuedAndFullyPaid",
            "WeightedAverageShares",
        ],
    ),
    ConceptDefinition::synonyms(
        COST_OF_GOODS_AND_SERVICES_SOLD,
        Some("CostOfGoodsAndServicesSold"),
        &["CostOfRevenue"],
    ),
    ConceptDefinition::synonyms(
        DEBT_INTEREST_RATE,
        None,
        &[
            "DebtWeightedAverageInterestRate",
            "LongtermDebtWeightedAverageInterestRate",
            "ShortTermDebtWeightedAverageInterestRate",
        ],
    ),
    ConceptDefinition::synonyms(DEBT_REPAYMENT, Some("RepaymentsOfLongTermDebt"), &[]),
    ConceptDefinition::synonyms(
        DEPRECIATION_AND_AMORTIZATION,
        Some("DepreciationAndAmortization"),
        &[
            "DepreciationDepletionAndAmortization",
            "DepreciationAndAmortizationExcludingNuclearFuel",
        ],
    ),
    ConceptDefinition::synonyms(
        DILUTED_SHARES_OUTSTANDING,
        Some("WeightedAverageNumberOfDilutedSharesOutstanding"),
        &["WeightedAverageNumberOfShareOutstandingBasicAndDiluted"],
    ),
    ConceptDefinition::synonyms(
        DIVIDEND_PER_SHARE,
        None,
        &[
            "CommonStockDividendsPerShareCashPaid",
            "CommonStockDividendsPerShareDeclared",
            "DividendsRecognisedAsDistributionsToOwnersPerShare",
        ],
    ),
    ConceptDefinition::synonyms(
        EARNINGS_PER_SHARE_DILUTED,
        Some("EarningsPerShareDiluted"),
        &["EarningsPerShareBasicAndDiluted"],
    ),
    ConceptDefinition::synonyms(
        EFFECTIVE_INCOME_TAX_RATE,
        Some("EffectiveIncomeTaxRateContinuingOperations"),
        &[],
    ),
    ConceptDefinition::synonyms(ENTITY_PUBLIC_FLOAT, Some("EntityPublicFloat"), &[]),
    ConceptDefinition::synonyms(
        EQUITY,
        Some("StockholdersEquity"),
        &[
            "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
            "EquityAttributableToOwnersOfParent",
            "Equity",
        ],
    ),
    ConceptDefinition::synonyms(GROSS_PROFIT, Some("GrossProfit"), &[]),
    ConceptDefinition::synonyms(
        INCOME_TAX_EXPENSE,
        Some("IncomeTaxExpenseBenefit"),
        &["IncomeTaxesPaidNet"],
    ),
    ConceptDefinition::synonyms(
        INTEREST_EXPENSE,
        Some("InterestExpense"),
        &[
            "InterestExpenseNet",
            "InterestExpenseNetOfHedgeIneffectiveness",
        ],
    ),
    ConceptDefinition::synonyms(LIABILITIES_CURRENT, Some("LiabilitiesCurrent"), &[]),
    ConceptDefinition::synonyms(
        LONG_TERM_DEBT,
        Some("LongTermDebt"),
        &[
            "LongTermDebtNoncurrent",
            "LongtermBorrowings",
            "LongTermDebtAndCapitalLeaseObligations",
            "OtherLiabilitiesNoncurrent",
            "NoncurrentFinancialLiabilities",
        ],
    ),
    ConceptDefinition::synonyms(
        MARKETABLE_SECURITIES_CURRENT,
        Some("MarketableSecuritiesCurrent"),
        &["ShortTermInvestments"],
    ),
    ConceptDefinition::synonyms(
        NET_INCOME_LOSS,
        Some("NetIncomeLoss"),
        &[
            "ProfitLoss",
            "NetIncomeLossAvailableToCommonStockholdersBasic",
            "ProfitLossAttributableToOwnersOfParent",
        ],
    ),
    ConceptDefinition::synonyms(
        OPERATING_INCOME_LOSS,
        Some("OperatingIncomeLoss"),
        &[
            "IncomeLossFromContinuingOperationsBeforeIncomeTaxesMinorityInterestAndIncomeLossFromEquityMethodInvestments",
            "IncomeLossFromContinuingOperationsBeforeIncomeTaxesExtraordinaryItemsNoncontrollingInterest",
            "IncomeLossFromOperationsBeforeIncomeTaxExpenseBenefit",
        ],
    ),
    ConceptDefinition::synonyms(
        PAYMENTS_OF_DIVIDENDS,
        None,
        &[
            "PaymentsOfDividendsCommonStock",
            "PaymentsOfDividends",
            "PaymentsOfOrdinaryDividends",
            "DividendsPaidToEquityHoldersOfParentClassifiedAsFinancingActivities",
            "DividendsPaidClassifiedAsFinancingActivities",
        ],
    ),
    ConceptDefinition::synonyms(
        PROPERTY_PLANT_AND_EQUIPMENT_GROSS,
        Some("PropertyPlantAndEquipmentGross"),
        &[
            "RealEstateInvestmentPropertyAtCost",
            "GrossInvestmentInRealEstateAssets",
            "PropertyPlantAndEquipment",
        ],
    ),
    ConceptDefinition::synonyms(
        PROPERTY_PLANT_AND_EQUIPMENT_NET,
        Some("PropertyPlantAndEquipmentNet"),
        &[
            "NetInvestmentInRealEstateAssets",
            "RealEstateInvestmentPropertyNet",
            "PropertyPlantAndEquipment",
        ],
    ),
    ConceptDefinition::synonyms(
        REVENUES,
        Some("Revenues"),
        &[
            "RevenueFromContractWithCustomerExcludingAssessedTax",
            "SalesRevenueNet",
            "Revenue",
            "RevenueFromSaleOfGoods",
            "RevenueFromContractsWithCustomers",
            "NoninterestIncome",
        ],
    ),
    ConceptDefinition::sum(
        SHORT_TERM_PAYABLES,
        &[
            "TradeAndOtherCurrentPayables",
            "AccountsPayableCurrent",
            "EmployeeRelatedLiabilitiesCurrent",
            "CurrentTaxLiabilitiesCurrent",
            "AccruedIncomeTaxesCurrent",
            "OtherShorttermProvisions",
            "LiabilitiesIncludedInDisposalGroupsClassifiedAsHeldForSale",
            "ContractWithCustomerLiabilityCurrent",
            "AccountsPayableAndAccruedLiabilitiesCurrent",
            "AccruedLiabilitiesCurrent",
            "AccruedRebatesReturnsAndPromotions",
            "OtherLiabilitiesCurrent",
        ],
    ),
];

static GLOBAL: LazyLock<ConceptRegistry> = LazyLock::new(|| ConceptRegistry::new(DEFINITIONS));

/// Immutable lookup from concept name to its definition.
///
/// Safe for unsynchronized concurrent reads; nothing is registered at runtime.
#[derive(Debug)]
pub struct ConceptRegistry {
    definitions: &'static [ConceptDefinition],
    by_name: HashMap<&'static str, usize>,
    shared: BTreeMap<&'static str, Vec<&'static str>>,
}

impl ConceptRegistry {
    /// Builds a registry over `definitions`.
    #[must_use]
    pub fn new(definitions: &'static [ConceptDefinition]) -> Self {
        let by_name = definitions
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name, i))
            .collect();

        let mut owners: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();
        for definition in definitions {
            for tag in definition.tags() {
                owners.entry(tag).or_default().push(definition.name);
            }
        }
        owners.retain(|_, concepts| concepts.len() > 1);

        Self {
            definitions,
            by_name,
            shared: owners,
        }
    }

    /// Returns the built-in catalog.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the definition of a registered concept.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ConceptDefinition> {
        self.by_name.get(name).map(|&i| &self.definitions[i])
    }

    /// Returns true if `name` is a registered concept.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Returns every definition in catalog order.
    #[must_use]
    pub const fn concepts(&self) -> &[ConceptDefinition] {
        self.definitions
    }

    /// Returns the ordered tags for `concept`.
    ///
    /// An unregistered name is treated as a raw tag and returned as its own
    /// only synonym.
    #[must_use]
    pub fn synonyms_for<'a>(&'a self, concept: &'a str) -> Vec<&'a str> {
        match self.get(concept) {
            Some(definition) => definition.tags(),
            None => vec![concept],
        }
    }

    /// Returns tags registered under more than one concept, with the
    /// concepts that claim them.
    #[must_use]
    pub const fn shared_tags(&self) -> &BTreeMap<&'static str, Vec<&'static str>> {
        &self.shared
    }

    /// Returns true if `tag` is registered under more than one concept.
    #[must_use]
    pub fn is_shared(&self, tag: &str) -> bool {
        self.shared.contains_key(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_tag_comes_first() {
        let registry = ConceptRegistry::global();
        let tags = registry.synonyms_for(REVENUES);
        assert_eq!(tags[0], "Revenues");
        assert_eq!(tags[1], "RevenueFromContractWithCustomerExcludingAssessedTax");
        assert_eq!(
            tags.iter().filter(|t| **t == "Revenues").count(),
            1,
            "canonical tag must not be repeated"
        );
    }

    #[test]
    fn test_registry_order_without_canonical_tag() {
        let tags = ConceptRegistry::global().synonyms_for(CASH_FROM_OPERATING_ACTIVITIES);
        assert_eq!(
            tags,
            vec![
                "NetCashProvidedByUsedInOperatingActivitiesContinuingOperations",
                "NetCashProvidedByUsedInOperatingActivities",
                "CashFlowsFromUsedInOperatingActivities",
            ]
        );
    }

    #[test]
    fn test_unregistered_concept_passes_through() {
        let registry = ConceptRegistry::global();
        assert!(!registry.contains("InventoryNet"));
        assert_eq!(registry.synonyms_for("InventoryNet"), vec!["InventoryNet"]);
    }

    #[test]
    fn test_aggregate_concepts() {
        let registry = ConceptRegistry::global();
        assert_eq!(registry.get(CAPEX).unwrap().kind, ConceptKind::Sum);
        assert_eq!(registry.get(SHORT_TERM_PAYABLES).unwrap().kind, ConceptKind::Sum);
        assert_eq!(registry.get(REVENUES).unwrap().kind, ConceptKind::Synonyms);
    }

    #[test]
    fn test_shared_tags_are_reported() {
        let registry = ConceptRegistry::global();
        let owners = registry.shared_tags().get("PropertyPlantAndEquipment").unwrap();
        assert_eq!(
            owners,
            &vec![
                PROPERTY_PLANT_AND_EQUIPMENT_GROSS,
                PROPERTY_PLANT_AND_EQUIPMENT_NET
            ]
        );
        assert!(registry.is_shared("PropertyPlantAndEquipment"));
        assert!(!registry.is_shared("Revenues"));
    }

    #[test]
    fn test_concept_names_are_unique() {
        let registry = ConceptRegistry::global();
        assert_eq!(registry.concepts().len(), DEFINITIONS.len());
        for definition in registry.concepts() {
            assert_eq!(registry.get(definition.name), Some(definition));
        }
    }
}
