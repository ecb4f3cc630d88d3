//! Source registry with ordered fallback.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, instrument, warn};

use fundamentals_core::{
    Cadence, Cik, EntityDirectory, EntityInfo, FactDocument, FactSource, FactsError,
    FinancialTable, Result, Symbol,
};

use crate::company::Company;

/// Default number of entities fetched concurrently by [`Fundamentals::tables`].
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Entry point for retrieving reconciled fundamentals.
///
/// `Fundamentals` holds the registered fact sources and entity directories
/// and tries them in registration order until one succeeds.
///
/// # Example
///
/// ```rust,ignore
/// use fundamentals::{Cadence, Fundamentals, concept};
///
/// let fundamentals = Fundamentals::new().with_edgar("MyApp/1.0 (contact@example.com)")?;
///
/// let apple = fundamentals.company("AAPL").await?;
/// let table = apple.table(&[concept::REVENUES, "ProfitMargin"], Cadence::Annual);
/// ```
pub struct Fundamentals {
    fact_sources: Vec<Arc<dyn FactSource>>,
    directories: Vec<Arc<dyn EntityDirectory>>,
    concurrency: usize,
}

impl Default for Fundamentals {
    fn default() -> Self {
        Self {
            fact_sources: Vec::new(),
            directories: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl std::fmt::Debug for Fundamentals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fundamentals")
            .field(
                "fact_sources",
                &self.fact_sources.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field(
                "directories",
                &self.directories.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl Fundamentals {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many entities [`Fundamentals::tables`] fetches at once.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Register a fact source.
    pub fn register_facts(&mut self, source: Arc<dyn FactSource>) {
        debug!(source = source.name(), "Registering fact source");
        self.fact_sources.push(source);
    }

    /// Register an entity directory.
    pub fn register_directory(&mut self, directory: Arc<dyn EntityDirectory>) {
        debug!(directory = directory.name(), "Registering entity directory");
        self.directories.push(directory);
    }

    /// Resolves a trading symbol, trying directories in order.
    ///
    /// # Errors
    /// Returns [`FactsError::ProviderNotConfigured`] without directories,
    /// otherwise the error of the last directory tried.
    #[instrument(skip_all, fields(symbol = %symbol))]
    pub async fn lookup(&self, symbol: &Symbol) -> Result<EntityInfo> {
        if self.directories.is_empty() {
            return Err(FactsError::ProviderNotConfigured(
                "No entity directories registered".to_string(),
            ));
        }

        let mut last_error = None;
        for directory in &self.directories {
            match directory.lookup(symbol).await {
                Ok(info) => return Ok(info),
                Err(e) => {
                    warn!(
                        directory = directory.name(),
                        error = %e,
                        "Directory failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            FactsError::Other("All directories failed with no error".to_string())
        }))
    }

    /// Fetches the fact document of a filer, trying sources in order.
    ///
    /// When the last source reports a malformed document the failure is
    /// logged and an empty document is returned, so that reconciliation
    /// yields empty results rather than an error.
    ///
    /// # Errors
    /// Returns [`FactsError::ProviderNotConfigured`] without sources,
    /// otherwise the error of the last source tried.
    #[instrument(skip_all, fields(cik = %cik))]
    pub async fn fetch_document(&self, cik: &Cik) -> Result<FactDocument> {
        if self.fact_sources.is_empty() {
            return Err(FactsError::ProviderNotConfigured(
                "No fact sources registered".to_string(),
            ));
        }

        let mut last_error = None;
        for source in &self.fact_sources {
            debug!(source = source.name(), "Fetching fact document");

            match source.fetch_facts(cik).await {
                Ok(document) => return Ok(document),
                Err(e) => {
                    warn!(
                        source = source.name(),
                        error = %e,
                        "Source failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(FactsError::MalformedDocument(reason)) => {
                warn!(reason = %reason, "Malformed fact document, treating as no data");
                Ok(FactDocument::empty())
            }
            Some(e) => Err(e),
            None => Err(FactsError::Other(
                "All sources failed with no error".to_string(),
            )),
        }
    }

    /// Resolves `symbol` and fetches its document once.
    ///
    /// # Errors
    /// Returns lookup or fetch failures.
    pub async fn company(&self, symbol: impl Into<Symbol>) -> Result<Company> {
        let symbol = symbol.into();
        let info = self.lookup(&symbol).await?;
        let document = self.fetch_document(&info.cik).await?;
        Ok(Company::new(info, document))
    }

    /// Fetches a filer's document by CIK, bypassing the directories.
    ///
    /// # Errors
    /// Returns fetch failures.
    pub async fn company_by_cik(&self, cik: Cik) -> Result<Company> {
        let document = self.fetch_document(&cik).await?;
        let name = document.entity_name().unwrap_or_default().to_string();
        Ok(Company::new(
            EntityInfo::new(Symbol::default(), cik, name),
            document,
        ))
    }

    /// Builds one table for `symbol`.
    ///
    /// # Errors
    /// Returns lookup or fetch failures; missing concepts are not errors.
    pub async fn table(
        &self,
        symbol: impl Into<Symbol>,
        concepts: &[&str],
        cadence: Cadence,
    ) -> Result<FinancialTable> {
        Ok(self.company(symbol).await?.table(concepts, cadence))
    }

    /// Builds one table per symbol, fetching up to the configured number of
    /// entities concurrently.
    ///
    /// Results are returned in the order of `symbols`; a failing symbol does
    /// not affect the others.
    #[instrument(skip_all, fields(symbol_count = symbols.len(), %cadence))]
    pub async fn tables(
        &self,
        symbols: &[Symbol],
        concepts: &[&str],
        cadence: Cadence,
    ) -> Vec<(Symbol, Result<FinancialTable>)> {
        stream::iter(symbols)
            .map(|symbol| async move {
                let table = self.table(symbol.clone(), concepts, cadence).await;
                if let Err(e) = &table {
                    warn!(symbol = %symbol, error = %e, "Failed to build table");
                }
                (symbol.clone(), table)
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Add the SEC EDGAR provider as fact source and directory.
    ///
    /// # Errors
    /// Returns [`FactsError::Network`] if the HTTP client cannot be built.
    #[cfg(feature = "edgar")]
    pub fn with_edgar(mut self, user_agent: &str) -> Result<Self> {
        let provider = Arc::new(fundamentals_edgar::EdgarProvider::new(user_agent)?);
        self.register_facts(provider.clone());
        self.register_directory(provider);
        Ok(self)
    }

    /// Add an SEC EDGAR provider built from `config`.
    ///
    /// # Errors
    /// Returns [`FactsError::Network`] if the HTTP client cannot be built.
    #[cfg(feature = "edgar")]
    pub fn with_edgar_config(mut self, config: fundamentals_edgar::EdgarConfig) -> Result<Self> {
        let provider = Arc::new(fundamentals_edgar::EdgarProvider::with_config(config)?);
        self.register_facts(provider.clone());
        self.register_directory(provider);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use fundamentals_concepts::concept;
    use fundamentals_core::DataSource;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    enum Reply {
        Document(Value),
        Fail,
    }

    #[derive(Debug)]
    struct MemorySource {
        name: &'static str,
        replies: HashMap<u64, Reply>,
        calls: AtomicUsize,
    }

    impl MemorySource {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                replies: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn with(mut self, cik: u64, reply: Reply) -> Self {
            self.replies.insert(cik, reply);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DataSource for MemorySource {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "in-memory fact source"
        }
    }

    #[async_trait]
    impl FactSource for MemorySource {
        async fn fetch_facts(&self, cik: &Cik) -> Result<FactDocument> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.replies.get(&cik.value()) {
                Some(Reply::Document(value)) => FactDocument::from_value(value),
                Some(Reply::Fail) => Err(FactsError::Network("connection reset".to_string())),
                None => Err(FactsError::EntityNotFound(cik.to_string())),
            }
        }
    }

    #[derive(Debug)]
    struct MemoryDirectory(Vec<EntityInfo>);

    impl DataSource for MemoryDirectory {
        fn name(&self) -> &str {
            "memory"
        }

        fn description(&self) -> &str {
            "in-memory directory"
        }
    }

    #[async_trait]
    impl EntityDirectory for MemoryDirectory {
        async fn lookup(&self, symbol: &Symbol) -> Result<EntityInfo> {
            self.0
                .iter()
                .find(|info| &info.symbol == symbol)
                .cloned()
                .ok_or_else(|| FactsError::EntityNotFound(symbol.to_string()))
        }
    }

    fn directory() -> Arc<MemoryDirectory> {
        Arc::new(MemoryDirectory(vec![
            EntityInfo::new(Symbol::new("ACME"), Cik::new(1), "Acme Corp"),
            EntityInfo::new(Symbol::new("GLBX"), Cik::new(2), "Globex"),
        ]))
    }

    fn acme_facts() -> Value {
        json!({
            "entityName": "Acme Corp",
            "facts": {"us-gaap": {
                "Revenues": {"units": {"USD": [
                    {"start": "2021-01-01", "end": "2021-12-31", "val": 100.0, "form": "10-K", "filed": "2022-02-01"},
                    {"start": "2022-01-01", "end": "2022-12-31", "val": 121.0, "form": "10-K", "filed": "2023-02-01"}
                ]}},
                "NetIncomeLoss": {"units": {"USD": [
                    {"start": "2022-01-01", "end": "2022-12-31", "val": 12.1, "form": "10-K", "filed": "2023-02-01"}
                ]}}
            }}
        })
    }

    fn fundamentals(source: Arc<MemorySource>) -> Fundamentals {
        let mut fundamentals = Fundamentals::new();
        fundamentals.register_facts(source);
        fundamentals.register_directory(directory());
        fundamentals
    }

    #[tokio::test]
    async fn test_no_sources_configured() {
        let result = Fundamentals::new().fetch_document(&Cik::new(1)).await;
        assert!(matches!(result, Err(FactsError::ProviderNotConfigured(_))));

        let result = Fundamentals::new().lookup(&Symbol::new("ACME")).await;
        assert!(matches!(result, Err(FactsError::ProviderNotConfigured(_))));
    }

    #[tokio::test]
    async fn test_falls_back_to_next_source() {
        let failing = Arc::new(MemorySource::new("failing").with(1, Reply::Fail));
        let working =
            Arc::new(MemorySource::new("working").with(1, Reply::Document(acme_facts())));

        let mut fundamentals = fundamentals(failing.clone());
        fundamentals.register_facts(working.clone());

        let company = fundamentals.company("acme").await.unwrap();
        assert_eq!(company.name(), "Acme Corp");
        assert_eq!(failing.calls(), 1);
        assert_eq!(working.calls(), 1);
    }

    #[tokio::test]
    async fn test_last_error_is_returned() {
        let source = Arc::new(MemorySource::new("failing").with(1, Reply::Fail));
        let result = fundamentals(source).company("ACME").await;
        assert!(matches!(result, Err(FactsError::Network(_))));
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let source = Arc::new(MemorySource::new("memory"));
        let result = fundamentals(source).company("NOPE").await;
        assert!(matches!(result, Err(FactsError::EntityNotFound(_))));
    }

    #[tokio::test]
    async fn test_malformed_document_is_no_data() {
        let source = Arc::new(
            MemorySource::new("memory").with(1, Reply::Document(json!({"cik": 1, "entityName": "Acme"}))),
        );
        let table = fundamentals(source)
            .table("ACME", &[concept::REVENUES], Cadence::Annual)
            .await
            .unwrap();

        assert_eq!(table.width(), 1);
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_document_fetched_once_per_company() {
        let source = Arc::new(MemorySource::new("memory").with(1, Reply::Document(acme_facts())));
        let fundamentals = fundamentals(source.clone());

        let company = fundamentals.company("ACME").await.unwrap();
        let table = company.table(&[concept::REVENUES, concept::NET_INCOME_LOSS], Cadence::Annual);
        let margin = company.series("ProfitMargin", Cadence::Annual);

        assert_eq!(table.height(), 2);
        assert_eq!(margin.len(), 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_batch_tables_keep_symbol_order() {
        let source = Arc::new(
            MemorySource::new("memory")
                .with(1, Reply::Document(acme_facts()))
                .with(2, Reply::Fail),
        );
        let fundamentals = fundamentals(source).with_concurrency(2);
        let symbols = [Symbol::new("GLBX"), Symbol::new("ACME"), Symbol::new("NOPE")];

        let results = fundamentals
            .tables(&symbols, &[concept::REVENUES], Cadence::Annual)
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, Symbol::new("GLBX"));
        assert!(matches!(results[0].1, Err(FactsError::Network(_))));

        let acme = results[1].1.as_ref().unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 12, 31).unwrap();
        assert_eq!(acme.value(concept::REVENUES, end), Some(121.0));

        assert!(matches!(results[2].1, Err(FactsError::EntityNotFound(_))));
    }

    #[tokio::test]
    async fn test_company_by_cik() {
        let source = Arc::new(MemorySource::new("memory").with(1, Reply::Document(acme_facts())));
        let company = fundamentals(source).company_by_cik(Cik::new(1)).await.unwrap();
        assert_eq!(company.name(), "Acme Corp");
        assert_eq!(company.cik(), Cik::new(1));
    }

    #[test]
    fn test_debug_lists_source_names() {
        let source = Arc::new(MemorySource::new("memory"));
        let debug = format!("{:?}", fundamentals(source));
        assert!(debug.contains("memory"));
        assert!(debug.contains("concurrency"));
    }

    #[cfg(feature = "edgar")]
    #[test]
    fn test_with_edgar_registers_both_roles() {
        let fundamentals = Fundamentals::new()
            .with_edgar("Test/1.0 (test@example.com)")
            .unwrap();
        let debug = format!("{fundamentals:?}");
        assert_eq!(debug.matches("SEC EDGAR").count(), 2);
    }
}
