//! Minimal HTTP client for fetching result pages.
//!
//! - Browser-like identification headers (arbitrary sites gate on them)
//! - Per-request timeout; non-2xx statuses surface as typed errors
//! - Structured `tracing` events for request start, response, and errors,
//!   with bodies truncated before they reach a log line
//!
//! Retry policy deliberately lives with the caller: one `get_text` call is
//! one attempt, so the extraction pipeline owns its own attempt budget.
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), delver_http::HttpError> {
//! let client = delver_http::PageClient::new()?;
//! let page = client.get_text("https://example.com/article").await?;
//! assert!(page.body.contains("<html"));
//! # Ok(()) }
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

/// Chrome-flavoured User-Agent sent with every page fetch.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("client build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned {status} for {url}")]
    Status { status: StatusCode, url: String },
}

/// A fetched page body plus the URL the fetch settled on after redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub body: String,
}

/// Thin `reqwest` wrapper tuned for fetching arbitrary result pages.
#[derive(Clone)]
pub struct PageClient {
    inner: Client,
    pub timeout: Duration,
    user_agent: String,
}

impl PageClient {
    /// Construct a client with the default timeout and User-Agent.
    ///
    /// ```no_run
    /// use delver_http::{HttpError, PageClient};
    /// use std::time::Duration;
    ///
    /// let client = PageClient::new()?;
    /// assert_eq!(client.timeout, Duration::from_secs(60));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new() -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.timeout = dur;
        self
    }

    /// Override the User-Agent header.
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Issue a single GET and return the body text.
    ///
    /// Exactly one attempt: network failures and non-2xx statuses both come
    /// back as errors for the caller's retry loop to count.
    pub async fn get_text(&self, url: &str) -> Result<FetchedPage, HttpError> {
        let url = Url::parse(url).map_err(|e| HttpError::Url(e.to_string()))?;

        tracing::debug!(
            target: "http",
            host_path = %format!("{}{}", url.domain().unwrap_or("-"), url.path()),
            timeout_ms = self.timeout.as_millis() as u64,
            "http.request.start"
        );

        let t0 = std::time::Instant::now();
        let resp = self
            .inner
            .get(url.clone())
            .headers(self.identification_headers())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(target: "http", url = %url, error = %err, "http.network_error");
                HttpError::Network(err.to_string())
            })?;

        let status = resp.status();
        let final_url = resp.url().to_string();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(
                target: "http",
                %status,
                url = %final_url,
                body_snippet = %snip_body(&body),
                "http.error"
            );
            return Err(HttpError::Status {
                status,
                url: final_url,
            });
        }

        let body = resp.text().await.map_err(|err| {
            tracing::warn!(target: "http", url = %final_url, error = %err, "http.network_error.body");
            HttpError::Network(err.to_string())
        })?;

        tracing::debug!(
            target: "http",
            %status,
            url = %final_url,
            duration_ms = t0.elapsed().as_millis() as u64,
            body_len = body.len(),
            "http.response"
        );

        Ok(FetchedPage { final_url, body })
    }

    fn identification_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(ua) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers
    }
}

fn snip_body(body: &str) -> String {
    if body.len() <= 500 {
        return body.to_string();
    }
    let mut end = 500;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
