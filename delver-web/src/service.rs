//! Entry operations exposed to the calling layer.
//!
//! The caller (CLI, an RPC wrapper, a test) sees exactly two operations and
//! a three-way error taxonomy; everything else in this crate is detail.

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use delver_common::RunLimits;

use crate::extract::PageContentExtractor;
use crate::orchestrator::SearchOrchestrator;
use crate::types::{SearchResult, WebsiteInfo};

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required argument was empty.
    #[error("{0} must not be empty")]
    InvalidArgument(&'static str),

    /// The search pipeline produced no result.
    #[error("search scrape failed")]
    ScrapeFailure,

    /// Single-page extraction produced no result.
    #[error("content extraction failed for {0}")]
    ExtractionFailure(String),
}

/// The two operations callers invoke.
pub struct SearchService {
    orchestrator: SearchOrchestrator,
    extractor: PageContentExtractor,
}

impl SearchService {
    pub fn new(orchestrator: SearchOrchestrator, extractor: PageContentExtractor) -> Self {
        Self {
            orchestrator,
            extractor,
        }
    }

    /// Full pipeline: question tree plus summarised top results.
    pub async fn search(
        &self,
        query: &str,
        limits: RunLimits,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, ServiceError> {
        if query.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("query"));
        }
        self.orchestrator
            .run(query, limits.max_questions, limits.max_websites, cancel)
            .await
            .ok_or(ServiceError::ScrapeFailure)
    }

    /// Summarise a single page.
    pub async fn extract_page(&self, url: &str) -> Result<WebsiteInfo, ServiceError> {
        if url.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("url"));
        }
        self.extractor
            .extract(url)
            .await
            .ok_or_else(|| ServiceError::ExtractionFailure(url.to_string()))
    }
}
