//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the per-run HTTP client with the profile's user agent and timeout
//! - Single GET requests (no retries; failures are reported to the caller)
//! - Error classification into HTTP-status and network failures

use crate::config::SiteProfile;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty when absent)
        content_type: String,
        /// Response body
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns true for a successful response that is (or may be) HTML
    ///
    /// A missing Content-Type is given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        match self {
            Self::Success { content_type, .. } => {
                content_type.is_empty() || content_type.to_ascii_lowercase().contains("html")
            }
            _ => false,
        }
    }

    /// Short description of a failed fetch, for status messages
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Source of documents for a crawl run
///
/// Used for both pages and sitemaps, so implementations must not reject a
/// response by content type; the caller decides what it accepts.
///
/// The engine awaits exactly one `fetch` at a time, so implementations need
/// no internal synchronization for ordering.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Issues a single GET for `url`
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// Builds an HTTP client for one crawl run
///
/// The client (cookies, connection pool) belongs to the run that built it and
/// is never shared with another run.
///
/// # Example
///
/// ```no_run
/// use linkmap::config::SiteProfile;
/// use linkmap::crawler::build_http_client;
///
/// let profile = SiteProfile::blog_defaults("example.com");
/// let client = build_http_client(&profile).unwrap();
/// ```
pub fn build_http_client(profile: &SiteProfile) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(profile.crawler.timeout_secs);

    Client::builder()
        .user_agent(profile.user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`Fetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a fresh client configured from the profile
    pub fn new(profile: &SiteProfile) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(profile)?,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        fetch_url(&self.client, url).await
    }
}

/// Fetches a URL with a single GET and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Success` |
/// | Other status | `HttpError` |
/// | Timeout | `NetworkError("Request timeout")` |
/// | Connection failure | `NetworkError("Connection failed: ...")` |
/// | Body read failure | `NetworkError` |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: if e.is_timeout() {
                "Request timeout".to_string()
            } else {
                e.to_string()
            },
        },
    }
}
