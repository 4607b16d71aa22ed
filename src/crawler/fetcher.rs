//! HTTP fetcher
//!
//! Every network read made by the crawl goes through [`HttpFetcher`]:
//! - listing and article pages as text, bounded by the request timeout
//! - featured images as bytes, bounded by the image timeout
//! - transient failures retried through [`retry_async`]
//! - non-success status codes mapped to [`DigestError::HttpStatus`]

use crate::config::{Config, CrawlerConfig};
use crate::retry::{retry_async, RetryPolicy};
use crate::{DigestError, Result};
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use tracing::debug;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header sent with every request
/// * `timeout` - Default per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use affairs_digest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("DigestBot/1.0", Duration::from_secs(20)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrying HTTP reader shared by the crawl and the article fetches
///
/// Cloning is cheap: the underlying client is reference counted.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
    image_timeout: Duration,
}

impl HttpFetcher {
    pub fn new(client: Client, policy: RetryPolicy, image_timeout: Duration) -> Self {
        Self {
            client,
            policy,
            image_timeout,
        }
    }

    /// Builds a fetcher from the `[crawler]` and `[user-agent]` tables
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(&config.user_agent.value, config.crawler.request_timeout())?;
        Ok(Self::new(
            client,
            retry_policy(&config.crawler),
            config.crawler.image_timeout(),
        ))
    }

    /// The underlying client, for callers that build their own requests
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches a page body as text
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Return the body |
    /// | HTTP 429, 5xx | Retry with backoff |
    /// | Timeout, connection failure | Retry with backoff |
    /// | Other HTTP status | Fail immediately |
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        retry_async(&self.policy, url, DigestError::is_transient, move || async move {
            let response = self.send(url, None).await?;
            response.text().await.map_err(|e| map_reqwest_error(url, e))
        })
        .await
    }

    /// Fetches a binary resource (such as an image) with the image timeout
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        retry_async(&self.policy, url, DigestError::is_transient, move || async move {
            let response = self.send(url, Some(self.image_timeout)).await?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| map_reqwest_error(url, e))?;
            Ok(bytes.to_vec())
        })
        .await
    }

    async fn send(&self, url: &str, timeout: Option<Duration>) -> Result<Response> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_reqwest_error(url, e))?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "Fetched");

        if !status.is_success() {
            return Err(DigestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

/// Derives the fetch retry policy from the crawler configuration
pub fn retry_policy(config: &CrawlerConfig) -> RetryPolicy {
    RetryPolicy::new(config.max_retries, config.retry_base_delay())
}

fn map_reqwest_error(url: &str, error: reqwest::Error) -> DigestError {
    if error.is_timeout() {
        DigestError::Timeout {
            url: url.to_string(),
        }
    } else {
        DigestError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
