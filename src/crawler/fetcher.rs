//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests for HTML pages
//! - Error classification (timeout, network, status, content type)
//! - Retry logic for transient failures

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::FetchError;
use reqwest::{Client, Url};
use std::time::Duration;

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

/// Attempt limits for one request
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first
    pub max_retries: u32,

    /// Upper bound for a single attempt
    pub timeout: Duration,

    /// Pause before each retry
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            timeout: config.request_timeout(),
            delay: config.retry_delay(),
        }
    }
}

/// A request that failed on every attempt
#[derive(Debug, Clone)]
pub struct FetchFailure {
    /// Error from the last attempt
    pub error: FetchError,

    /// Number of attempts made
    pub attempts: u32,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a single HTML page, without retrying
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML (or no) Content-Type | `Ok(FetchedPage)` |
/// | Other status | `FetchError::Status` |
/// | 2xx with non-HTML Content-Type | `FetchError::NotHtml` |
/// | Timeout | `FetchError::Timeout` |
/// | Connection/body error | `FetchError::Network` |
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.is_empty() && !content_type.contains("html") {
        return Err(FetchError::NotHtml {
            url: url.to_string(),
            content_type,
        });
    }

    let body = response.text().await.map_err(|e| classify_error(url, e))?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        body,
    })
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Fetches a page, retrying transient failures
///
/// Makes at most `1 + policy.max_retries` attempts, each bounded by
/// `policy.timeout`. Non-retryable errors stop immediately.
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<FetchedPage, FetchFailure> {
    let mut attempts = 0;

    loop {
        attempts += 1;

        let result = match tokio::time::timeout(policy.timeout, fetch_page(client, url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        };

        let error = match result {
            Ok(page) => return Ok(page),
            Err(error) => error,
        };

        if !error.is_retryable() || attempts > policy.max_retries {
            return Err(FetchFailure { error, attempts });
        }

        tracing::warn!(
            "Attempt {}/{} for {} failed: {}; retrying",
            attempts,
            policy.max_retries + 1,
            url,
            error
        );
        tokio::time::sleep(policy.delay).await;
    }
}
