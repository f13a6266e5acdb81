use crate::engine_browser::{pacer::Pacer, page::EnginePage};
use anyhow::Result;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::collections::HashMap;
use webdriver::capabilities::Capabilities;

/// User agent presented by the automated session. Matches the identity the
/// fetch side sends so the engine and the result pages see the same browser.
const SESSION_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Chrome arguments for a session the engine will treat as a regular visitor.
fn session_arguments(headless: bool) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-extensions".to_string(),
        format!("--user-agent={SESSION_USER_AGENT}"),
        "--window-size=1920,1080".to_string(),
        "--lang=en-US,en".to_string(),
    ];
    if headless {
        args.push("--headless".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}

/// Thin wrapper around a `fantoccini` WebDriver client.
pub struct EngineDriver {
    pub client: Client,
    pacer: Pacer,
}

impl EngineDriver {
    /// Create a new driver connected to a running WebDriver service
    /// (Chromedriver at `http://localhost:9515` by convention).
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(session_arguments(headless)));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await?;

        tracing::debug!(target: "browser", webdriver_url, headless, "session opened");

        Ok(Self {
            client,
            pacer: Pacer::new(),
        })
    }

    /// Hand out a page wrapper over this session.
    pub fn page(&self) -> EnginePage {
        EnginePage::new(self.client.clone(), self.pacer.clone())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        tracing::debug!(target: "browser", "session closed");
        Ok(())
    }
}
