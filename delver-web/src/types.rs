//! Artifacts handed to the caller. Wire names are camelCase to match the
//! JSON shape consumers of the original endpoints already parse.

use serde::{Deserialize, Serialize};

/// One expanded "people also ask" widget: the question that was clicked and
/// the new questions its expansion revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEntry {
    pub initial_question: String,
    pub related_questions: Vec<String>,
}

/// Summary of one fetched result page.
///
/// `content_summary` is at most 503 characters and ends in `...` exactly
/// when the normalized page text ran past 500. `website` is the positional
/// label (`"Website 1"`) attached by the orchestrator; single-page
/// extraction leaves it unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteInfo {
    pub url: String,
    pub title: String,
    pub content_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// The sole artifact of a full search run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub related_questions: Vec<QuestionEntry>,
    pub website_contents: Vec<WebsiteInfo>,
}
