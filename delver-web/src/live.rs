//! Fantoccini-backed [`SearchSurface`] implementation.

use std::time::Duration;

use async_trait::async_trait;

use delver_drivers::engine_browser::driver::EngineDriver;
use delver_drivers::engine_browser::page::EnginePage;

use crate::surface::{SearchSurface, SurfaceError, SurfaceProvider};

/// Budget for the engine home page's search input to render.
const SEARCH_INPUT_WAIT: Duration = Duration::from_secs(10);

fn session_err(err: anyhow::Error) -> SurfaceError {
    SurfaceError::Session(err.to_string())
}

fn interaction_err(err: anyhow::Error) -> SurfaceError {
    SurfaceError::Interaction(err.to_string())
}

/// One WebDriver session pointed at the configured engine.
pub struct WebDriverSurface {
    driver: Option<EngineDriver>,
    page: EnginePage,
    home_url: String,
    search_input: String,
}

#[async_trait]
impl SearchSurface for WebDriverSurface {
    async fn submit_query(&mut self, query: &str) -> Result<(), SurfaceError> {
        self.page.goto(&self.home_url).await.map_err(session_err)?;

        let rendered = self
            .page
            .wait_for_selector(&self.search_input, SEARCH_INPUT_WAIT)
            .await
            .map_err(session_err)?;
        if !rendered {
            return Err(SurfaceError::SelectorTimeout {
                selector: self.search_input.clone(),
                waited_ms: SEARCH_INPUT_WAIT.as_millis() as u64,
            });
        }

        let input = self
            .page
            .find(&self.search_input)
            .await
            .map_err(interaction_err)?;
        input.type_text(query).await.map_err(interaction_err)?;
        input.press_enter().await.map_err(interaction_err)?;
        Ok(())
    }

    async fn await_selector(
        &mut self,
        selector: &str,
        budget: Duration,
    ) -> Result<(), SurfaceError> {
        let rendered = self
            .page
            .wait_for_selector(selector, budget)
            .await
            .map_err(session_err)?;
        if rendered {
            Ok(())
        } else {
            Err(SurfaceError::SelectorTimeout {
                selector: selector.to_string(),
                waited_ms: budget.as_millis() as u64,
            })
        }
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), SurfaceError> {
        self.page.scroll_to_bottom().await.map_err(session_err)
    }

    async fn settle(&mut self, base: Duration) {
        self.page.settle(base).await;
    }

    async fn count(&mut self, selector: &str) -> Result<usize, SurfaceError> {
        Ok(self.page.find_all(selector).await.map_err(session_err)?.len())
    }

    async fn await_count_change(
        &mut self,
        selector: &str,
        previous: usize,
        budget: Duration,
    ) -> Result<usize, SurfaceError> {
        self.page
            .wait_for_count_change(selector, previous, budget)
            .await
            .map_err(session_err)
    }

    async fn text_at(&mut self, selector: &str, index: usize) -> Result<String, SurfaceError> {
        let elements = self.page.find_all(selector).await.map_err(session_err)?;
        let element = elements.get(index).ok_or_else(|| {
            SurfaceError::Interaction(format!("no element at `{selector}`[{index}]"))
        })?;
        element.text().await.map_err(interaction_err)
    }

    async fn click_at(&mut self, selector: &str, index: usize) -> Result<(), SurfaceError> {
        let elements = self.page.find_all(selector).await.map_err(session_err)?;
        let element = elements.get(index).ok_or_else(|| {
            SurfaceError::Interaction(format!("no element at `{selector}`[{index}]"))
        })?;
        element.click().await.map_err(interaction_err)
    }

    async fn link_in(
        &mut self,
        block_selector: &str,
        index: usize,
        link_selector: &str,
    ) -> Result<Option<String>, SurfaceError> {
        let blocks = self
            .page
            .find_all(block_selector)
            .await
            .map_err(session_err)?;
        let block = blocks.get(index).ok_or_else(|| {
            SurfaceError::Interaction(format!("no element at `{block_selector}`[{index}]"))
        })?;

        let Some(link) = block
            .find_all(link_selector)
            .await
            .map_err(interaction_err)?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        link.attr("href").await.map_err(interaction_err)
    }

    async fn close(&mut self) -> Result<(), SurfaceError> {
        if let Some(driver) = self.driver.take() {
            driver.close().await.map_err(session_err)?;
        }
        Ok(())
    }
}

/// Opens fantoccini sessions against a configured WebDriver endpoint.
#[derive(Debug, Clone)]
pub struct WebDriverProvider {
    pub webdriver_url: String,
    pub home_url: String,
    pub headless: bool,
    pub search_input: String,
}

#[async_trait]
impl SurfaceProvider for WebDriverProvider {
    async fn open(&self) -> Result<Box<dyn SearchSurface>, SurfaceError> {
        let driver = EngineDriver::connect(&self.webdriver_url, self.headless)
            .await
            .map_err(session_err)?;
        let page = driver.page();
        Ok(Box::new(WebDriverSurface {
            driver: Some(driver),
            page,
            home_url: self.home_url.clone(),
            search_input: self.search_input.clone(),
        }))
    }
}
