//! "People also ask" collection.
//!
//! One `collect` call owns one browser session and one [`CollectState`];
//! nothing survives the call. Each round scrolls to hydrate more widgets,
//! records every newly visible question as an entry, then expands the new
//! entries one by one. Recording the whole batch before the first click
//! keeps sibling initial questions out of each other's related lists; the
//! revealed texts are deduplicated against everything the run has seen.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::locator::QuestionLocator;
use crate::surface::{ensure_live, SearchSurface, SurfaceError, SurfaceProvider};
use crate::types::QuestionEntry;

/// Rounds of the scroll-and-expand loop before giving up on new widgets.
const MAX_ROUNDS: usize = 5;
/// Scroll-to-bottom passes per round.
const SCROLL_PASSES: usize = 3;
/// Settle delay after each scroll pass.
const SCROLL_SETTLE: Duration = Duration::from_secs(1);
/// Budget for an expansion to grow the widget list.
const EXPAND_WAIT: Duration = Duration::from_secs(2);
/// Budget for the first question widget to appear at all.
const QUESTION_WAIT: Duration = Duration::from_secs(10);

/// Dedup state for one run, passed explicitly through every step.
#[derive(Debug, Default)]
struct CollectState {
    /// Question texts recorded as initial questions.
    initials: HashSet<String>,
    /// Question texts already attached to some entry's related list.
    linked: HashSet<String>,
}

/// Outcome of expanding one initial question.
enum Expansion {
    Expanded(QuestionEntry),
    Skipped {
        question: String,
        reason: SurfaceError,
    },
}

/// Builds the deduplicated question tree for a query.
pub struct RelatedQuestionCollector {
    provider: Arc<dyn SurfaceProvider>,
    locator: QuestionLocator,
}

impl RelatedQuestionCollector {
    pub fn new(provider: Arc<dyn SurfaceProvider>, locator: QuestionLocator) -> Self {
        Self { provider, locator }
    }

    /// Collect up to `max_initial` question entries in discovery order.
    ///
    /// The session is closed on every exit path, including errors and
    /// cancellation.
    pub async fn collect(
        &self,
        query: &str,
        max_initial: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<QuestionEntry>, SurfaceError> {
        let mut surface = self.provider.open().await?;
        let outcome = self.drive(surface.as_mut(), query, max_initial, cancel).await;
        if let Err(err) = surface.close().await {
            tracing::warn!(target: "web.questions", error = %err, "session close failed");
        }
        outcome
    }

    async fn drive(
        &self,
        surface: &mut dyn SearchSurface,
        query: &str,
        max_initial: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<QuestionEntry>, SurfaceError> {
        surface.submit_query(query).await?;

        match surface
            .await_selector(&self.locator.question, QUESTION_WAIT)
            .await
        {
            Ok(()) => {}
            Err(SurfaceError::SelectorTimeout { .. }) => {
                tracing::info!(target: "web.questions", query, "no question widgets rendered");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        }

        let mut state = CollectState::default();
        let mut entries: Vec<QuestionEntry> = Vec::new();

        for round in 1..=MAX_ROUNDS {
            ensure_live(cancel)?;
            for _ in 0..SCROLL_PASSES {
                surface.scroll_to_bottom().await?;
                surface.settle(SCROLL_SETTLE).await;
            }

            let visible = surface.count(&self.locator.question).await?;
            if visible == 0 {
                tracing::debug!(target: "web.questions", round, "no widgets left to reveal");
                break;
            }

            let batch = self
                .record_batch(surface, visible, max_initial - entries.len(), &mut state)
                .await;

            for (index, text) in batch {
                ensure_live(cancel)?;
                match self.expand(surface, index, &text, &mut state).await {
                    Expansion::Expanded(entry) => {
                        tracing::debug!(
                            target: "web.questions",
                            question = %entry.initial_question,
                            related = entry.related_questions.len(),
                            "question expanded"
                        );
                        entries.push(entry);
                    }
                    Expansion::Skipped { question, reason } => {
                        tracing::warn!(
                            target: "web.questions",
                            question = %question,
                            error = %reason,
                            "question skipped"
                        );
                    }
                }
            }

            if entries.len() >= max_initial {
                break;
            }
        }

        Ok(entries)
    }

    /// Sweep the currently visible widgets and claim up to `budget` new
    /// initial questions before anything is clicked.
    async fn record_batch(
        &self,
        surface: &mut dyn SearchSurface,
        visible: usize,
        budget: usize,
        state: &mut CollectState,
    ) -> Vec<(usize, String)> {
        let mut batch = Vec::new();
        for index in 0..visible {
            if batch.len() >= budget {
                break;
            }
            let text = match surface.text_at(&self.locator.question, index).await {
                Ok(text) => text,
                Err(reason) => {
                    tracing::warn!(
                        target: "web.questions",
                        index,
                        error = %reason,
                        "unreadable question element skipped"
                    );
                    continue;
                }
            };
            if text.is_empty() || !state.initials.insert(text.clone()) {
                continue;
            }
            batch.push((index, text));
        }
        batch
    }

    /// Click one widget and gather the questions its expansion revealed.
    ///
    /// A failure anywhere in the step skips this question only; the caller
    /// keeps iterating.
    async fn expand(
        &self,
        surface: &mut dyn SearchSurface,
        index: usize,
        initial: &str,
        state: &mut CollectState,
    ) -> Expansion {
        match self.reveal(surface, index, initial, state).await {
            Ok(related) => Expansion::Expanded(QuestionEntry {
                initial_question: initial.to_string(),
                related_questions: related,
            }),
            Err(reason) => Expansion::Skipped {
                question: initial.to_string(),
                reason,
            },
        }
    }

    async fn reveal(
        &self,
        surface: &mut dyn SearchSurface,
        index: usize,
        initial: &str,
        state: &mut CollectState,
    ) -> Result<Vec<String>, SurfaceError> {
        let before = surface.count(&self.locator.question).await?;
        surface.click_at(&self.locator.question, index).await?;

        // An expansion that reveals nothing within the budget is not an
        // error; the unchanged list simply yields no new related questions.
        let revealed = surface
            .await_count_change(&self.locator.question, before, EXPAND_WAIT)
            .await?;
        let mut related = Vec::new();
        for j in 0..revealed {
            let text = surface.text_at(&self.locator.question, j).await?;
            if text.is_empty()
                || text == initial
                || state.initials.contains(&text)
                || state.linked.contains(&text)
            {
                continue;
            }
            state.linked.insert(text.clone());
            related.push(text);
        }
        Ok(related)
    }
}
