//! Browser capability consumed by the collectors.
//!
//! The collectors never talk to WebDriver directly; they drive a
//! [`SearchSurface`], which models a search results page at the granularity
//! the loops need (wait, scroll, count, read, click). Production code plugs
//! in the fantoccini-backed implementation from [`crate::live`]; tests plug
//! in scripted doubles.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Failures a surface can report, ordered from "expected structure never
/// appeared" to "the session itself is gone".
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The wait budget elapsed before `selector` matched anything.
    /// Collectors degrade this to an empty collection.
    #[error("no element matched `{selector}` within {waited_ms}ms")]
    SelectorTimeout { selector: String, waited_ms: u64 },

    /// A click/read on one element failed; the affected item is skipped.
    #[error("element interaction failed: {0}")]
    Interaction(String),

    /// The browser session failed outright.
    #[error("browser session error: {0}")]
    Session(String),

    /// The caller-supplied deadline fired.
    #[error("cancelled by caller deadline")]
    Cancelled,
}

/// One scoped browser session pointed at a search engine.
///
/// Elements are addressed as `(selector, index)` pairs against the current
/// DOM; a click may invalidate previously observed indices, so callers
/// re-query (`count`) after any mutation.
#[async_trait]
pub trait SearchSurface: Send {
    /// Navigate to the engine home and submit `query` into the search input.
    async fn submit_query(&mut self, query: &str) -> Result<(), SurfaceError>;

    /// Wait until `selector` matches at least one element, up to `budget`.
    async fn await_selector(&mut self, selector: &str, budget: Duration)
        -> Result<(), SurfaceError>;

    /// Scroll the viewport to the document bottom.
    async fn scroll_to_bottom(&mut self) -> Result<(), SurfaceError>;

    /// Give lazily-loaded widgets time to render.
    async fn settle(&mut self, base: Duration);

    /// Number of elements currently matching `selector`.
    async fn count(&mut self, selector: &str) -> Result<usize, SurfaceError>;

    /// Wait until the number of `selector` matches moves off `previous`,
    /// up to `budget`, and return the count observed last. Budget expiry is
    /// not an error; the unchanged count comes back instead.
    async fn await_count_change(
        &mut self,
        selector: &str,
        previous: usize,
        budget: Duration,
    ) -> Result<usize, SurfaceError>;

    /// Visible text of the `index`-th match of `selector`.
    async fn text_at(&mut self, selector: &str, index: usize) -> Result<String, SurfaceError>;

    /// Click the `index`-th match of `selector`.
    async fn click_at(&mut self, selector: &str, index: usize) -> Result<(), SurfaceError>;

    /// `href` of the first `link_selector` inside the `index`-th
    /// `block_selector` match, if the block exposes one.
    async fn link_in(
        &mut self,
        block_selector: &str,
        index: usize,
        link_selector: &str,
    ) -> Result<Option<String>, SurfaceError>;

    /// Release the underlying session. Idempotent.
    async fn close(&mut self) -> Result<(), SurfaceError>;
}

/// Opens a fresh [`SearchSurface`] for each collector call.
#[async_trait]
pub trait SurfaceProvider: Send + Sync {
    async fn open(&self) -> Result<Box<dyn SearchSurface>, SurfaceError>;
}

/// Check the caller-supplied deadline at a loop boundary.
pub(crate) fn ensure_live(cancel: &CancellationToken) -> Result<(), SurfaceError> {
    if cancel.is_cancelled() {
        Err(SurfaceError::Cancelled)
    } else {
        Ok(())
    }
}
