//! Composition of the two collectors and the extractor.
//!
//! Everything runs strictly sequentially: questions, then organic links,
//! then one fetch per link in rank order. This bounds the outbound request
//! rate at the cost of latency; per-URL failures stay independent either
//! way because a dropped page is simply omitted.

use tokio_util::sync::CancellationToken;

use crate::extract::PageContentExtractor;
use crate::organic::OrganicResultCollector;
use crate::questions::RelatedQuestionCollector;
use crate::surface::{ensure_live, SurfaceError};
use crate::types::SearchResult;

pub struct SearchOrchestrator {
    questions: RelatedQuestionCollector,
    organic: OrganicResultCollector,
    extractor: PageContentExtractor,
}

impl SearchOrchestrator {
    pub fn new(
        questions: RelatedQuestionCollector,
        organic: OrganicResultCollector,
        extractor: PageContentExtractor,
    ) -> Self {
        Self {
            questions,
            organic,
            extractor,
        }
    }

    /// Run the whole pipeline for one query.
    ///
    /// `None` means the run failed somewhere it could not degrade; callers
    /// never see a partially-filled result presented as complete.
    pub async fn run(
        &self,
        query: &str,
        max_questions: usize,
        max_websites: usize,
        cancel: &CancellationToken,
    ) -> Option<SearchResult> {
        match self
            .try_run(query, max_questions, max_websites, cancel)
            .await
        {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::error!(target: "web.orchestrator", query, error = %err, "search run failed");
                None
            }
        }
    }

    async fn try_run(
        &self,
        query: &str,
        max_questions: usize,
        max_websites: usize,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, SurfaceError> {
        let related_questions = self.questions.collect(query, max_questions, cancel).await?;
        let urls = self.organic.collect(query, max_websites, cancel).await?;

        let mut website_contents = Vec::new();
        for (index, url) in urls.iter().enumerate() {
            ensure_live(cancel)?;
            if let Some(mut info) = self.extractor.extract_with(url, cancel).await {
                info.website = Some(format!("Website {}", index + 1));
                website_contents.push(info);
            }
        }
        // A deadline that fired during the last fetch must surface as a
        // failed run, not as a shorter result.
        ensure_live(cancel)?;

        tracing::info!(
            target: "web.orchestrator",
            query,
            questions = related_questions.len(),
            websites = website_contents.len(),
            "search run complete"
        );

        Ok(SearchResult {
            related_questions,
            website_contents,
        })
    }
}
