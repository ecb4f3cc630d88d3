//! Configuration for the EDGAR provider.

use std::time::Duration;

/// SEC EDGAR API base URL.
pub const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// SEC company tickers URL.
pub const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Default rate limit: 10 requests per second (SEC requirement).
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`EdgarProvider`](crate::EdgarProvider).
///
/// The SEC requires an identifying user agent of the form
/// `"AppName/Version (contact@email.com)"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgarConfig {
    /// User agent sent with every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Minimum interval between two requests.
    pub rate_limit: Duration,
    /// Base URL of the company facts API.
    pub base_url: String,
    /// URL of the ticker directory.
    pub tickers_url: String,
}

impl Default for EdgarConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("fundamentals/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: DEFAULT_TIMEOUT,
            rate_limit: DEFAULT_RATE_LIMIT,
            base_url: EDGAR_BASE_URL.to_string(),
            tickers_url: COMPANY_TICKERS_URL.to_string(),
        }
    }
}

impl EdgarConfig {
    /// Creates a default configuration with the given user agent.
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Self::default()
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the minimum interval between requests.
    #[must_use]
    pub const fn with_rate_limit(mut self, interval: Duration) -> Self {
        self.rate_limit = interval;
        self
    }

    /// Sets the company facts base URL (e.g. a mirror or a test server).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the ticker directory URL.
    #[must_use]
    pub fn with_tickers_url(mut self, url: impl Into<String>) -> Self {
        self.tickers_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EdgarConfig::default();
        assert_eq!(config.rate_limit, Duration::from_millis(100));
        assert_eq!(config.base_url, EDGAR_BASE_URL);
        assert!(config.user_agent.starts_with("fundamentals/"));
    }

    #[test]
    fn test_builders() {
        let config = EdgarConfig::new("Test/1.0 (test@example.com)")
            .with_timeout(Duration::from_secs(5))
            .with_rate_limit(Duration::ZERO)
            .with_base_url("http://localhost:8080/")
            .with_tickers_url("http://localhost:8080/tickers.json");

        assert_eq!(config.user_agent, "Test/1.0 (test@example.com)");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.rate_limit, Duration::ZERO);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.tickers_url, "http://localhost:8080/tickers.json");
    }
}
