use anyhow::Result;
use fantoccini::elements::Element;
use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone)]
/// Paces interaction so lazily-loaded widgets have time to render and typing
/// does not arrive as one instantaneous burst.
pub struct Pacer {}

impl Pacer {
    pub fn new() -> Self {
        Self {}
    }

    /// Sleep for `base` plus a small random jitter.
    ///
    /// Engine result pages hydrate question widgets after scroll and click;
    /// the jitter keeps repeated runs from hammering on an exact cadence.
    pub async fn settle(&self, base: Duration) {
        let mut rng = OsRng;
        let jitter = rng.gen_range(0..=250u64);
        sleep(base + Duration::from_millis(jitter)).await;
    }

    /// Sleep for a random duration between `min` and `max` milliseconds.
    pub async fn random_delay(&self, min: u64, max: u64) {
        let mut rng = OsRng;
        let ms = rng.gen_range(min..=max);
        sleep(Duration::from_millis(ms)).await;
    }

    /// Type the provided text with small random delays between characters.
    pub async fn type_text(&self, element: &Element, text: &str) -> Result<()> {
        for ch in text.chars() {
            element.send_keys(&ch.to_string()).await?;
            self.random_delay(30, 150).await;
        }
        Ok(())
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}
