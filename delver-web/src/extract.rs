//! Result-page content extraction.
//!
//! One [`PageContentExtractor::extract`] call makes up to `max_retries`
//! fetch attempts and stops at the first HTTP success, whatever the page
//! turns out to contain. Extraction then runs readability first and falls
//! back to stripping the DOM of non-content subtrees when readability finds
//! nothing. A page that never answers is dropped (`None`) rather than
//! reported as an error; the orchestrator omits it from the final result.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};
use tokio_util::sync::CancellationToken;
use url::Url;

use delver_http::{FetchedPage, HttpError, PageClient};

use crate::clean::clean;
use crate::types::WebsiteInfo;

/// Summaries are cut at this many characters before the ellipsis marker.
const SUMMARY_LIMIT: usize = 500;

/// Subtrees discarded by the fallback strategy.
const DISCARDED_SUBTREES: &[&str] = &["script", "style", "nav", "header", "footer"];

/// Page-fetch capability: one call is one GET attempt.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, HttpError>;
}

/// Production fetcher backed by [`delver_http::PageClient`].
pub struct HttpPageFetcher {
    client: PageClient,
}

impl HttpPageFetcher {
    pub fn new(client: PageClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, HttpError> {
        self.client.get_text(url).await
    }
}

/// Fetches a result page and distils it into a [`WebsiteInfo`].
#[derive(Clone)]
pub struct PageContentExtractor {
    fetcher: Arc<dyn PageFetcher>,
    max_retries: usize,
}

impl PageContentExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            max_retries: 3,
        }
    }

    /// Override the per-URL attempt budget.
    pub fn with_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Extract with no caller deadline.
    pub async fn extract(&self, url: &str) -> Option<WebsiteInfo> {
        self.extract_with(url, &CancellationToken::new()).await
    }

    /// Up to `max_retries` fetch attempts; the first HTTP success wins and
    /// no further attempts run, even when the page distils to an empty
    /// summary. Exhaustion yields `None`.
    pub async fn extract_with(&self, url: &str, cancel: &CancellationToken) -> Option<WebsiteInfo> {
        for attempt in 1..=self.max_retries {
            if cancel.is_cancelled() {
                tracing::debug!(target: "web.extract", url, "cancelled before attempt");
                return None;
            }
            let fetched = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(target: "web.extract", url, "cancelled mid-fetch");
                    return None;
                }
                outcome = self.fetcher.fetch(url) => outcome,
            };
            match fetched {
                Ok(page) => return Some(distil(url, &page.body)),
                Err(err) => {
                    tracing::warn!(
                        target: "web.extract",
                        url,
                        attempt,
                        max_retries = self.max_retries,
                        error = %err,
                        "fetch attempt failed"
                    );
                }
            }
        }
        tracing::warn!(target: "web.extract", url, "all attempts failed; dropping page");
        None
    }
}

/// Turn raw HTML into the caller-facing summary record.
fn distil(url: &str, html: &str) -> WebsiteInfo {
    distil_with_primary(url, html, readable_content(url, html))
}

fn distil_with_primary(url: &str, html: &str, primary: Option<String>) -> WebsiteInfo {
    let body_text = match primary {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            tracing::debug!(target: "web.extract", url, "readability empty; using DOM fallback");
            visible_text(html)
        }
    };

    WebsiteInfo {
        url: url.to_string(),
        title: document_title(html),
        content_summary: summarize(&clean(&body_text)),
        website: None,
    }
}

/// Primary strategy: readability-style main-content extraction.
fn readable_content(url: &str, html: &str) -> Option<String> {
    let base = Url::parse(url).ok()?;
    let mut reader = Cursor::new(html.as_bytes());
    readability::extractor::extract(&mut reader, &base)
        .ok()
        .map(|product| product.text)
}

/// Fallback strategy: every text node outside script/style/nav/header/footer
/// subtrees, joined with single spaces.
fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();
    collect_text(document.tree.root(), &mut parts);
    parts.join(" ")
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut Vec<String>) {
    for child in node.children() {
        match child.value() {
            Node::Element(el) if DISCARDED_SUBTREES.contains(&el.name()) => {}
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
            _ => collect_text(child, out),
        }
    }
}

/// First `<title>` text, else the literal `"No Title"`.
fn document_title(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("title") else {
        return "No Title".to_string();
    };
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "No Title".to_string())
}

/// Cut normalized text at [`SUMMARY_LIMIT`] characters, marking the cut.
fn summarize(cleaned: &str) -> String {
    if cleaned.chars().count() > SUMMARY_LIMIT {
        let head: String = cleaned.chars().take(SUMMARY_LIMIT).collect();
        format!("{head}...")
    } else {
        cleaned.to_string()
    }
}
