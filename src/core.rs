use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::config::{ClientConfig, EdgarUrls};
use super::error::{ExtractError, Result};

const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Rate-limited HTTP client for the SEC EDGAR archives.
///
/// All network access in this crate goes through `EdgarClient`: the quarterly
/// XBRL indices, each filing's `FilingSummary.xml`, and the generated report
/// pages. The parsing layer itself never performs I/O, so the client is the
/// single place where SEC fair-access compliance lives.
///
/// The SEC limits automated systems to 10 requests per second. The client
/// enforces this with a token bucket; when the bucket is empty, requests wait
/// until tokens become available. Rate limit responses (HTTP 429) and transient
/// network failures are retried with exponential backoff and jitter.
///
/// # Examples
///
/// ```rust
/// # use statementkit::EdgarClient;
/// let client = EdgarClient::new("my_app/1.0 (my@email.com)")?;
/// # Ok::<(), statementkit::ExtractError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EdgarClient {
    /// HTTP client for making requests
    pub(crate) client: reqwest::Client,

    /// Token bucket rate limiter for SEC compliance
    pub(crate) rate_limiter: Arc<Governor>,

    /// Base URL for EDGAR archives
    pub(crate) edgar_archives_url: String,

    /// Base URL for the quarterly full-index directories
    pub(crate) edgar_full_index_url: String,
}

impl EdgarClient {
    /// Creates a new client with sensible defaults: 10 requests per second,
    /// 30-second timeout, standard SEC.gov base URLs.
    ///
    /// # Arguments
    ///
    /// * `user_agent` - A descriptive identifier for your application in the
    ///   form "AppName/Version (contact@email.com)". The SEC requires this so
    ///   they can contact you if your application causes issues.
    pub fn new(user_agent: &str) -> Result<Self> {
        let config = ClientConfig {
            user_agent: user_agent.to_string(),
            rate_limit: 10,
            timeout: Duration::from_secs(30),
            base_urls: EdgarUrls::default(),
        };
        Self::with_config(config)
    }

    /// Creates a client with custom configuration.
    ///
    /// Useful for testing against mock servers or adjusting the rate limit
    /// and timeout for your environment.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::ConfigError` if the user agent is malformed, the
    /// rate limit is zero, or the HTTP client cannot be built.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ExtractError::ConfigError(format!("Invalid user agent: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExtractError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(config.rate_limit).ok_or_else(|| {
                ExtractError::ConfigError("Rate limit must be greater than zero".to_string())
            })?,
        )));

        Ok(EdgarClient {
            client,
            rate_limiter,
            edgar_archives_url: config.base_urls.archives,
            edgar_full_index_url: config.base_urls.full_index,
        })
    }

    /// Wait duration before the next retry: `(2^retry * 1000ms) +/- 20%`.
    ///
    /// The jitter prevents many clients from retrying in lockstep after a
    /// shared rate-limit response.
    fn calculate_backoff(retry: u32) -> Duration {
        let backoff_ms = INITIAL_BACKOFF_MS * (2_u64.pow(retry));
        let jitter = (backoff_ms as f64 * 0.2 * (fastrand::f64() - 0.5)) as i64;
        Duration::from_millis((backoff_ms as i64 + jitter) as u64)
    }

    /// Fetches binary content from a URL with rate limiting and retries.
    ///
    /// Used for the gzipped quarterly index files; everything else this crate
    /// downloads is text. Retries up to 5 times on HTTP 429 with exponential
    /// backoff; other HTTP errors return immediately.
    ///
    /// # Errors
    ///
    /// * `ExtractError::NotFound` - The resource doesn't exist (HTTP 404)
    /// * `ExtractError::RateLimitExceeded` - 429 persisted after max retries
    /// * `ExtractError::RequestError` - Network failure
    /// * `ExtractError::InvalidResponse` - Unexpected HTTP status code
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;

            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(ExtractError::RequestError)?;

            match response.status() {
                reqwest::StatusCode::OK => {
                    return response
                        .bytes()
                        .await
                        .map(|b| b.to_vec())
                        .map_err(ExtractError::RequestError);
                }
                reqwest::StatusCode::NOT_FOUND => {
                    return Err(ExtractError::NotFound);
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    if retries >= MAX_RETRIES {
                        return Err(ExtractError::RateLimitExceeded);
                    }
                    let retry_after = Self::calculate_backoff(retries);
                    tracing::warn!(
                        "Rate limit hit (429) for {}. Attempt {}/{}. Waiting {:?} before retry.",
                        url,
                        retries + 1,
                        MAX_RETRIES + 1,
                        retry_after
                    );
                    sleep(retry_after).await;
                    retries += 1;
                    continue;
                }
                status => {
                    return Err(ExtractError::InvalidResponse(format!(
                        "Unexpected status code: {} for URL: {}",
                        status, url
                    )));
                }
            }
        }
    }

    /// Fetches text content from a URL with rate limiting and retries.
    ///
    /// This is the workhorse for `FilingSummary.xml`, report HTML pages, and
    /// `index.json` directory listings. Rate limit responses honor the
    /// `Retry-After` header when present; network failures retry up to 5 times
    /// with exponential backoff.
    pub async fn get(&self, url: &str) -> Result<String> {
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;

            match self.client.get(url).send().await {
                Ok(response) => match response.status() {
                    reqwest::StatusCode::OK => {
                        return response.text().await.map_err(ExtractError::RequestError);
                    }
                    reqwest::StatusCode::NOT_FOUND => {
                        return Err(ExtractError::NotFound);
                    }
                    reqwest::StatusCode::TOO_MANY_REQUESTS => {
                        if retries >= MAX_RETRIES {
                            return Err(ExtractError::RateLimitExceeded);
                        }
                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|h| h.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .map(Duration::from_secs)
                            .unwrap_or_else(|| Self::calculate_backoff(retries));

                        tracing::warn!(
                            "Rate limit hit (429) for {}. Attempt {}/{}. Waiting {:?} before retry.",
                            url,
                            retries + 1,
                            MAX_RETRIES + 1,
                            retry_after
                        );
                        sleep(retry_after).await;
                        retries += 1;
                        continue;
                    }
                    status => {
                        let preview = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Failed to read error body".to_string())
                            .chars()
                            .take(200)
                            .collect::<String>();
                        return Err(ExtractError::InvalidResponse(format!(
                            "Unexpected status code: {} for URL: {}. Response preview: {}",
                            status, url, preview
                        )));
                    }
                },
                Err(e) => {
                    if retries >= MAX_RETRIES {
                        return Err(ExtractError::RequestError(e));
                    }
                    let backoff = Self::calculate_backoff(retries);
                    tracing::warn!(
                        "Request failed for {}: {:?}. Attempt {}/{}. Retrying in {:?}.",
                        url,
                        e,
                        retries + 1,
                        MAX_RETRIES + 1,
                        backoff
                    );
                    sleep(backoff).await;
                    retries += 1;
                    continue;
                }
            }
        }
    }

    /// Returns the base URL for EDGAR archives.
    pub fn archives_url(&self) -> &str {
        &self.edgar_archives_url
    }

    /// Returns the base URL for the quarterly full-index directories.
    pub fn full_index_url(&self) -> &str {
        &self.edgar_full_index_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_backoff() {
        let backoff0 = EdgarClient::calculate_backoff(0);
        let backoff1 = EdgarClient::calculate_backoff(1);
        let backoff2 = EdgarClient::calculate_backoff(2);

        // Check that backoff increases exponentially
        assert!(backoff0 < backoff1);
        assert!(backoff1 < backoff2);

        // Check that backoff is roughly within expected range
        assert!(backoff0.as_millis() >= 800 && backoff0.as_millis() <= 1200); // +/-20% of 1000ms
        assert!(backoff1.as_millis() >= 1600 && backoff1.as_millis() <= 2400); // +/-20% of 2000ms
        assert!(backoff2.as_millis() >= 3200 && backoff2.as_millis() <= 4800); // +/-20% of 4000ms
    }

    #[test]
    fn test_invalid_user_agent() {
        assert!(matches!(
            EdgarClient::new("bad\nagent"),
            Err(ExtractError::ConfigError(_))
        ));
    }

    #[test]
    fn test_zero_rate_limit() {
        let config = ClientConfig {
            rate_limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            EdgarClient::with_config(config),
            Err(ExtractError::ConfigError(_))
        ));
    }
}
