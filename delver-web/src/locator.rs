//! Selector tables for the widgets we drive.
//!
//! Engine markup drifts; the class names below are data, not code, so they
//! live in values the config layer can override rather than in the
//! collectors themselves. Defaults target Google's current markup. The
//! search-input selector belongs to the session side and lives with
//! [`crate::live::WebDriverProvider`].

use serde::Deserialize;

/// Selector for the "people also ask" question elements.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionLocator {
    /// One question element.
    pub question: String,
}

impl Default for QuestionLocator {
    fn default() -> Self {
        Self {
            question: "span.CSkcDe".to_string(),
        }
    }
}

/// Selectors for the organic result blocks.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultLocator {
    /// One organic result block.
    pub block: String,
    /// The primary link within a result block.
    pub link: String,
}

impl Default for ResultLocator {
    fn default() -> Self {
        Self {
            block: "div.g".to_string(),
            link: "a".to_string(),
        }
    }
}
