use std::time::Duration;

/// Configuration for the EDGAR client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// Rate limit in requests per second
    pub rate_limit: u32,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Base URLs for the EDGAR endpoints this crate touches
    pub base_urls: EdgarUrls,
}

/// Base URLs for the EDGAR endpoints this crate touches
#[derive(Debug, Clone)]
pub struct EdgarUrls {
    /// Base URL for EDGAR archives (filing directories and report pages)
    pub archives: String,
    /// Base URL for the quarterly full-index directories
    pub full_index: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "statementkit/0.1.0".to_string(),
            rate_limit: 10,
            timeout: Duration::from_secs(30),
            base_urls: EdgarUrls::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a new ClientConfig with custom settings
    ///
    /// # Basic usage
    ///
    /// ```rust
    /// use statementkit::{ClientConfig, EdgarUrls, EdgarClient};
    /// use std::time::Duration;
    /// let config = ClientConfig {
    ///    user_agent: "YourAppName contact@example.com".to_string(),
    ///    rate_limit: 10, // requests per second
    ///    timeout: Duration::from_secs(30),
    ///    base_urls: EdgarUrls::default(),
    /// };
    /// let client = EdgarClient::with_config(config)?;
    /// # Ok::<(), statementkit::ExtractError>(())
    /// ```
    pub fn new(
        user_agent: impl Into<String>,
        rate_limit: u32,
        timeout: Duration,
        base_urls: Option<EdgarUrls>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            rate_limit,
            timeout,
            base_urls: base_urls.unwrap_or_default(),
        }
    }
}

impl Default for EdgarUrls {
    fn default() -> Self {
        Self {
            archives: "https://www.sec.gov/Archives".to_string(),
            full_index: "https://www.sec.gov/Archives/edgar/full-index".to_string(),
        }
    }
}
