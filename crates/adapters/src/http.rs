//! HTTP adapter for source feed bodies and enclosure headers

use async_trait::async_trait;
use holginator_domain::{EnclosureLookupError, EnclosureProbe, FeedFetcher, SourceFetchError};
use reqwest::{Client, header::CONTENT_LENGTH};
use std::time::Duration;

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Timeout applied to every request
    pub timeout: Duration,
    /// User-Agent header sent upstream
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("holginator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// reqwest-backed feed fetcher and enclosure probe
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    client: Client,
}

impl HttpFeedClient {
    pub fn new(config: HttpConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self { client })
    }
}

fn fetch_error(url: &str, error: reqwest::Error) -> SourceFetchError {
    if error.is_timeout() {
        SourceFetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        SourceFetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

fn lookup_error(error: reqwest::Error) -> EnclosureLookupError {
    if error.is_timeout() {
        EnclosureLookupError::Timeout
    } else {
        EnclosureLookupError::Network(error.to_string())
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceFetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceFetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| fetch_error(url, e))?;

        tracing::debug!(url = %url, bytes = body.len(), "Fetched feed body");

        Ok(body.to_vec())
    }
}

#[async_trait]
impl EnclosureProbe for HttpFeedClient {
    async fn content_length(&self, url: &str) -> Result<Option<u64>, EnclosureLookupError> {
        let response = self.client.head(url).send().await.map_err(lookup_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnclosureLookupError::Status(status.as_u16()));
        }

        // Zero is what servers report when they don't know the size
        let length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|length| *length > 0);

        tracing::debug!(url = %url, length = ?length, "Probed enclosure");

        Ok(length)
    }
}
