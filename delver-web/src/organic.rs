//! Top organic result links.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::locator::ResultLocator;
use crate::surface::{ensure_live, SearchSurface, SurfaceError, SurfaceProvider};

/// Budget for the organic result container to render.
const RESULT_WAIT: Duration = Duration::from_secs(10);

/// Lists the top organic result URLs for a query, in rank order.
pub struct OrganicResultCollector {
    provider: Arc<dyn SurfaceProvider>,
    locator: ResultLocator,
}

impl OrganicResultCollector {
    pub fn new(provider: Arc<dyn SurfaceProvider>, locator: ResultLocator) -> Self {
        Self { provider, locator }
    }

    /// Collect hrefs from the first `min(max_websites, available)` result
    /// blocks. Blocks exposing no link are skipped, not substituted, so the
    /// output can be shorter than `max_websites`. The session is closed on
    /// every exit path.
    pub async fn collect(
        &self,
        query: &str,
        max_websites: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, SurfaceError> {
        let mut surface = self.provider.open().await?;
        let outcome = self.drive(surface.as_mut(), query, max_websites, cancel).await;
        if let Err(err) = surface.close().await {
            tracing::warn!(target: "web.organic", error = %err, "session close failed");
        }
        outcome
    }

    async fn drive(
        &self,
        surface: &mut dyn SearchSurface,
        query: &str,
        max_websites: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, SurfaceError> {
        surface.submit_query(query).await?;

        match surface.await_selector(&self.locator.block, RESULT_WAIT).await {
            Ok(()) => {}
            Err(SurfaceError::SelectorTimeout { .. }) => {
                tracing::info!(target: "web.organic", query, "no organic results rendered");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        }

        let available = surface.count(&self.locator.block).await?;
        let mut urls = Vec::new();
        for index in 0..available.min(max_websites) {
            ensure_live(cancel)?;
            match surface
                .link_in(&self.locator.block, index, &self.locator.link)
                .await
            {
                Ok(Some(href)) if !href.is_empty() => urls.push(href),
                Ok(_) => {
                    tracing::debug!(target: "web.organic", index, "result block exposes no link");
                }
                Err(reason) => {
                    tracing::warn!(
                        target: "web.organic",
                        index,
                        error = %reason,
                        "unreadable result block skipped"
                    );
                }
            }
        }

        tracing::debug!(target: "web.organic", query, count = urls.len(), "organic links collected");
        Ok(urls)
    }
}
