#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR source for tagged company facts.
//!
//! This crate provides:
//!
//! - CIK (Central Index Key) lookup from ticker symbols
//! - Company facts documents from the EDGAR XBRL API
//!
//! # Example
//!
//! ```no_run
//! use fundamentals_core::{EntityDirectory, FactSource, Symbol};
//! use fundamentals_edgar::EdgarProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = EdgarProvider::new("MyApp/1.0 (contact@example.com)")?;
//!
//!     let info = provider.lookup(&Symbol::new("AAPL")).await?;
//!     println!("Company: {} ({})", info.name, info.cik);
//!
//!     let document = provider.fetch_facts(&info.cik).await?;
//!     println!("Taxonomies: {}", document.taxonomies().len());
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use fundamentals_core::{
    Cik, DataSource, EntityDirectory, EntityInfo, FactDocument, FactSource, FactsError, Result,
    Symbol,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument};

/// Provider configuration.
pub mod config;

pub use config::{COMPANY_TICKERS_URL, DEFAULT_RATE_LIMIT, EDGAR_BASE_URL, EdgarConfig};

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    const fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// Ticker directory keyed by uppercase ticker.
type TickerDirectory = HashMap<String, EntityInfo>;

/// SEC EDGAR fact source and ticker directory.
///
/// Requests are serialized through a rate limiter (10 requests/second by
/// default, per SEC requirements). The ticker directory is downloaded on
/// first lookup and kept for the lifetime of the provider.
#[derive(Debug)]
pub struct EdgarProvider {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    config: EdgarConfig,
    tickers: OnceCell<TickerDirectory>,
}

impl EdgarProvider {
    /// Creates a provider with the default configuration and `user_agent`.
    ///
    /// # Errors
    /// Returns [`FactsError::Network`] if the HTTP client cannot be built.
    ///
    /// # Example
    /// ```
    /// use fundamentals_edgar::EdgarProvider;
    ///
    /// let provider = EdgarProvider::new("MyApp/1.0 (contact@example.com)").unwrap();
    /// ```
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::with_config(EdgarConfig::new(user_agent))
    }

    /// Creates a provider from a configuration.
    ///
    /// # Errors
    /// Returns [`FactsError::Network`] if the HTTP client cannot be built.
    pub fn with_config(config: EdgarConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| FactsError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, config))
    }

    /// Creates a provider with a pre-configured HTTP client.
    ///
    /// The client is used as is: the user agent and timeout of `config` are
    /// only applied by [`EdgarProvider::with_config`].
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: EdgarConfig) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(config.rate_limit))),
            config,
            tickers: OnceCell::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &EdgarConfig {
        &self.config
    }

    /// Returns the company facts URL for `cik`.
    #[must_use]
    pub fn company_facts_url(&self, cik: &Cik) -> String {
        format!("{}/api/xbrl/companyfacts/{cik}.json", self.config.base_url)
    }

    /// Looks up a company's CIK from its ticker symbol.
    ///
    /// # Errors
    /// Returns [`FactsError::InvalidParameter`] for an empty symbol and
    /// [`FactsError::EntityNotFound`] for an unknown one.
    pub async fn get_cik(&self, symbol: &Symbol) -> Result<Cik> {
        self.lookup(symbol).await.map(|info| info.cik)
    }

    /// Performs a rate-limited GET and decodes the JSON body.
    async fn get_json(&self, url: &str, what: &str) -> Result<Value> {
        self.rate_limiter.lock().await.wait().await;

        debug!(url = %url, "Fetching {what}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FactsError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FactsError::EntityNotFound(format!("{what} not found at {url}")));
        }
        if !status.is_success() {
            return Err(FactsError::Network(format!(
                "Failed to fetch {what}: HTTP {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| FactsError::Parse(format!("Failed to parse {what}: {e}")))
    }

    async fn ticker_directory(&self) -> Result<&TickerDirectory> {
        self.tickers
            .get_or_try_init(|| async {
                let value = self
                    .get_json(&self.config.tickers_url, "company tickers")
                    .await?;
                let directory = parse_ticker_directory(value)?;
                debug!(entries = directory.len(), "Loaded ticker directory");
                Ok::<_, FactsError>(directory)
            })
            .await
    }
}

impl DataSource for EdgarProvider {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    fn description(&self) -> &str {
        "SEC EDGAR XBRL company facts and ticker directory"
    }
}

#[async_trait]
impl FactSource for EdgarProvider {
    #[instrument(skip_all, fields(cik = %cik))]
    async fn fetch_facts(&self, cik: &Cik) -> Result<FactDocument> {
        let url = self.company_facts_url(cik);
        let value = self.get_json(&url, "company facts").await?;
        let document = FactDocument::from_value(&value)?;
        debug!(
            entity = document.entity_name().unwrap_or_default(),
            taxonomies = document.taxonomies().len(),
            "Fetched company facts"
        );
        Ok(document)
    }
}

#[async_trait]
impl EntityDirectory for EdgarProvider {
    async fn lookup(&self, symbol: &Symbol) -> Result<EntityInfo> {
        if symbol.as_str().is_empty() {
            return Err(FactsError::InvalidParameter("Empty ticker".to_string()));
        }

        let info = self
            .ticker_directory()
            .await?
            .get(symbol.as_str())
            .cloned()
            .ok_or_else(|| FactsError::EntityNotFound(symbol.to_string()))?;

        debug!(symbol = %symbol, cik = %info.cik, "Resolved ticker");
        Ok(info)
    }
}

// =============================================================================
// SEC API Response Types
// =============================================================================

/// Company ticker information from SEC JSON.
#[derive(Debug, Deserialize)]
struct CompanyTickerInfo {
    /// CIK as a number (SEC returns this as an integer)
    cik_str: u64,
    /// Ticker symbol
    ticker: String,
    /// Company name
    title: String,
}

/// Decodes the `company_tickers.json` payload, an object of
/// `{"0": {"cik_str": .., "ticker": .., "title": ..}, ...}` entries.
fn parse_ticker_directory(value: Value) -> Result<TickerDirectory> {
    let entries: HashMap<String, CompanyTickerInfo> = serde_json::from_value(value)
        .map_err(|e| FactsError::Parse(format!("Failed to parse company tickers: {e}")))?;

    Ok(entries
        .into_values()
        .map(|entry| {
            let symbol = Symbol::new(entry.ticker);
            let info = EntityInfo::new(symbol.clone(), Cik::new(entry.cik_str), entry.title);
            (symbol.as_str().to_string(), info)
        })
        .collect())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> EdgarProvider {
        EdgarProvider::with_client(
            reqwest::Client::new(),
            EdgarConfig::new("Test/1.0 (test@example.com)"),
        )
    }

    #[test]
    fn test_provider_traits() {
        let provider = EdgarProvider::new("Test/1.0 (test@example.com)").unwrap();

        assert_eq!(provider.name(), "SEC EDGAR");
        assert!(!provider.description().is_empty());
        assert_eq!(provider.config().user_agent, "Test/1.0 (test@example.com)");
    }

    #[test]
    fn test_company_facts_url() {
        let url = provider().company_facts_url(&Cik::new(320193));
        assert_eq!(
            url,
            "https://data.sec.gov/api/xbrl/companyfacts/CIK0000320193.json"
        );
    }

    #[test]
    fn test_parse_ticker_directory() {
        let directory = parse_ticker_directory(json!({
            "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
            "1": {"cik_str": 789019, "ticker": "msft", "title": "MICROSOFT CORP"}
        }))
        .unwrap();

        assert_eq!(directory.len(), 2);
        assert_eq!(directory["AAPL"].cik, Cik::new(320193));
        assert_eq!(directory["MSFT"].name, "MICROSOFT CORP");
    }

    #[test]
    fn test_parse_ticker_directory_rejects_bad_payload() {
        assert!(matches!(
            parse_ticker_directory(json!([1, 2, 3])),
            Err(FactsError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_symbol_is_invalid() {
        let result = provider().lookup(&Symbol::new("  ")).await;
        assert!(matches!(result, Err(FactsError::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let mut limiter = RateLimiter::new(Duration::from_millis(20));
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
