use crate::engine_browser::pacer::Pacer;
use anyhow::Result;
use fantoccini::error::CmdError;
use fantoccini::key::Key;
use fantoccini::{elements::Element, Client, Locator};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// How often [`EnginePage::wait_for_count_change`] re-queries the DOM.
const COUNT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// High-level page wrapper providing navigation, waits, and element queries.
pub struct EnginePage {
    pub(crate) client: Client,
    pub(crate) pacer: Pacer,
}

impl EnginePage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(client: Client, pacer: Pacer) -> Self {
        Self { client, pacer }
    }

    /// Navigate to `url`.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.pacer.random_delay(300, 1200).await;
        self.client.goto(url).await.map_err(anyhow::Error::from)
    }

    /// Wait until at least one element matches `selector`.
    ///
    /// Returns `Ok(true)` once a match renders, `Ok(false)` if the budget
    /// elapses first. Other WebDriver failures surface as errors.
    pub async fn wait_for_selector(&self, selector: &str, budget: Duration) -> Result<bool> {
        match self
            .client
            .wait()
            .at_most(budget)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(true),
            Err(CmdError::WaitTimeout) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Scroll the viewport to the document bottom to trigger lazy loading.
    pub async fn scroll_to_bottom(&self) -> Result<()> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight)", vec![])
            .await?;
        Ok(())
    }

    /// Poll until the number of `selector` matches differs from `previous`,
    /// returning the count observed last. The budget bounds the wait; on
    /// expiry the unchanged count comes back rather than an error.
    pub async fn wait_for_count_change(
        &self,
        selector: &str,
        previous: usize,
        budget: Duration,
    ) -> Result<usize> {
        let deadline = Instant::now() + budget;
        loop {
            let count = self.find_all(selector).await?.len();
            if count != previous || Instant::now() >= deadline {
                return Ok(count);
            }
            sleep(COUNT_POLL_INTERVAL).await;
        }
    }

    /// Pause for `base` plus jitter; used between scroll and re-query.
    pub async fn settle(&self, base: Duration) {
        self.pacer.settle(base).await;
    }

    /// Find a single element by CSS selector.
    pub async fn find(&self, selector: &str) -> Result<EngineElement> {
        let element = self.client.find(Locator::Css(selector)).await?;
        Ok(EngineElement::new(element, &self.pacer))
    }

    /// Find zero or more elements by CSS selector.
    pub async fn find_all(&self, selector: &str) -> Result<Vec<EngineElement>> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        Ok(elements
            .into_iter()
            .map(|element| EngineElement::new(element, &self.pacer))
            .collect())
    }
}

// =========================
// EngineElement
// =========================

#[derive(Clone)]
/// Wrapper for DOM elements with typed helpers consistent with [`EnginePage`].
pub struct EngineElement {
    pub element: Element,
    pacer: Pacer,
}

impl EngineElement {
    /// Construct an element wrapper.
    pub fn new(element: Element, pacer: &Pacer) -> Self {
        Self {
            element,
            pacer: pacer.clone(),
        }
    }

    /// Type into the element with paced keystrokes.
    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.pacer.type_text(&self.element, text).await
    }

    /// Send the Enter key to the element.
    pub async fn press_enter(&self) -> Result<()> {
        let enter: char = Key::Enter.into();
        self.element
            .send_keys(&enter.to_string())
            .await
            .map_err(anyhow::Error::from)
    }

    /// Click the element.
    pub async fn click(&self) -> Result<()> {
        self.element.click().await.map_err(anyhow::Error::from)
    }

    /// Find zero or more child elements by CSS selector.
    pub async fn find_all(&self, selector: &str) -> Result<Vec<EngineElement>> {
        let elements = self.element.find_all(Locator::Css(selector)).await?;
        Ok(elements
            .into_iter()
            .map(|element| EngineElement::new(element, &self.pacer))
            .collect())
    }

    /// Read an attribute value.
    pub async fn attr(&self, attribute: &str) -> Result<Option<String>> {
        self.element
            .attr(attribute)
            .await
            .map_err(anyhow::Error::from)
    }

    /// Return the element's visible text.
    pub async fn text(&self) -> Result<String> {
        self.element.text().await.map_err(anyhow::Error::from)
    }
}
