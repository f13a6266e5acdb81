//! Shared doubles for the capability traits plus tracing setup.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;

use delver_common::observability::{LogConfig, LogFormat};
use delver_http::{FetchedPage, HttpError};
use delver_web::extract::PageFetcher;
use delver_web::surface::{SearchSurface, SurfaceError, SurfaceProvider};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "delver-tests",
            emit_stderr: true,
            format: if std::env::var("DELVER_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug",
            ..LogConfig::default()
        };

        delver_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Scripted state behind a [`ScriptedSurface`].
///
/// The question widgets are a flat text list, like the live page: clicking a
/// widget appends the texts its expansion reveals. Organic results are a list
/// of blocks, each optionally exposing an href.
#[derive(Debug, Default)]
pub struct SurfaceScript {
    /// Question elements currently "rendered".
    pub questions: Vec<String>,
    /// Texts appended when the widget with the key text is clicked.
    /// Consumed on first click so repeat clicks reveal nothing new.
    pub expansions: HashMap<String, Vec<String>>,
    /// Widgets whose click is scripted to fail.
    pub fail_click: HashSet<String>,
    /// Whether the question container renders at all.
    pub questions_render: bool,
    /// Organic blocks: the primary link's href, or `None` for a linkless block.
    pub result_links: Vec<Option<String>>,
    /// Whether the organic container renders at all.
    pub results_render: bool,
    /// Scripted failure of query submission.
    pub fail_submit: bool,
    /// Scripted failure of session open.
    pub fail_open: bool,

    // Observed interactions.
    pub submitted: Vec<String>,
    pub scrolls: usize,
    pub opened: usize,
    pub closed: usize,
}

impl SurfaceScript {
    pub fn with_questions<I, S>(questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            questions: questions.into_iter().map(Into::into).collect(),
            questions_render: true,
            ..Self::default()
        }
    }

    pub fn expansion(mut self, question: &str, revealed: &[&str]) -> Self {
        self.expansions.insert(
            question.to_string(),
            revealed.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_result_links<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            result_links: links.into_iter().map(|l| l.map(Into::into)).collect(),
            results_render: true,
            ..Self::default()
        }
    }
}

/// Selector the scripted surface treats as the question widget list.
pub const QUESTION_SELECTOR: &str = "span.CSkcDe";
/// Selector the scripted surface treats as the organic block list.
pub const RESULT_SELECTOR: &str = "div.g";

pub struct ScriptedSurface(Arc<Mutex<SurfaceScript>>);

#[async_trait]
impl SearchSurface for ScriptedSurface {
    async fn submit_query(&mut self, query: &str) -> Result<(), SurfaceError> {
        let mut script = self.0.lock().unwrap();
        if script.fail_submit {
            return Err(SurfaceError::Session("scripted submit failure".into()));
        }
        script.submitted.push(query.to_string());
        Ok(())
    }

    async fn await_selector(
        &mut self,
        selector: &str,
        budget: Duration,
    ) -> Result<(), SurfaceError> {
        let script = self.0.lock().unwrap();
        let rendered = match selector {
            QUESTION_SELECTOR => script.questions_render,
            RESULT_SELECTOR => script.results_render,
            _ => false,
        };
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
        self.0.lock().unwrap().scrolls += 1;
        Ok(())
    }

    async fn settle(&mut self, _base: Duration) {}

    async fn count(&mut self, selector: &str) -> Result<usize, SurfaceError> {
        let script = self.0.lock().unwrap();
        Ok(match selector {
            QUESTION_SELECTOR => script.questions.len(),
            RESULT_SELECTOR => script.result_links.len(),
            _ => 0,
        })
    }

    async fn await_count_change(
        &mut self,
        selector: &str,
        _previous: usize,
        _budget: Duration,
    ) -> Result<usize, SurfaceError> {
        // Clicks mutate the scripted DOM synchronously, so the new count is
        // already observable.
        self.count(selector).await
    }

    async fn text_at(&mut self, selector: &str, index: usize) -> Result<String, SurfaceError> {
        let script = self.0.lock().unwrap();
        if selector != QUESTION_SELECTOR {
            return Err(SurfaceError::Interaction(format!(
                "no text at `{selector}`[{index}]"
            )));
        }
        script
            .questions
            .get(index)
            .cloned()
            .ok_or_else(|| SurfaceError::Interaction(format!("no element at [{index}]")))
    }

    async fn click_at(&mut self, selector: &str, index: usize) -> Result<(), SurfaceError> {
        let mut script = self.0.lock().unwrap();
        if selector != QUESTION_SELECTOR {
            return Err(SurfaceError::Interaction(format!(
                "not clickable: `{selector}`"
            )));
        }
        let text = script
            .questions
            .get(index)
            .cloned()
            .ok_or_else(|| SurfaceError::Interaction(format!("no element at [{index}]")))?;
        if script.fail_click.contains(&text) {
            return Err(SurfaceError::Interaction(format!(
                "scripted click failure on `{text}`"
            )));
        }
        if let Some(revealed) = script.expansions.remove(&text) {
            script.questions.extend(revealed);
        }
        Ok(())
    }

    async fn link_in(
        &mut self,
        block_selector: &str,
        index: usize,
        _link_selector: &str,
    ) -> Result<Option<String>, SurfaceError> {
        let script = self.0.lock().unwrap();
        if block_selector != RESULT_SELECTOR {
            return Ok(None);
        }
        script
            .result_links
            .get(index)
            .cloned()
            .ok_or_else(|| SurfaceError::Interaction(format!("no block at [{index}]")))
    }

    async fn close(&mut self) -> Result<(), SurfaceError> {
        self.0.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// Hands out [`ScriptedSurface`]s over one shared script.
pub struct ScriptedProvider(pub Arc<Mutex<SurfaceScript>>);

impl ScriptedProvider {
    pub fn new(script: SurfaceScript) -> (Arc<Mutex<SurfaceScript>>, Arc<dyn SurfaceProvider>) {
        let shared = Arc::new(Mutex::new(script));
        (shared.clone(), Arc::new(Self(shared)))
    }
}

#[async_trait]
impl SurfaceProvider for ScriptedProvider {
    async fn open(&self) -> Result<Box<dyn SearchSurface>, SurfaceError> {
        let mut script = self.0.lock().unwrap();
        if script.fail_open {
            return Err(SurfaceError::Session("scripted open failure".into()));
        }
        script.opened += 1;
        Ok(Box::new(ScriptedSurface(self.0.clone())))
    }
}

/// Per-URL fetch behavior for the scripted fetcher.
pub enum FetchScript {
    /// Succeed immediately with this body.
    Succeed(String),
    /// Fail this many attempts, then succeed with the body.
    FailTimes(usize, String),
    /// Never answer.
    FailAlways,
}

/// [`PageFetcher`] double with per-URL scripts and attempt counting.
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, FetchScript>,
    pub attempts: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    pub fn page(mut self, url: &str, script: FetchScript) -> Self {
        self.pages.insert(url.to_string(), script);
        self
    }

    pub fn attempts_for(&self, url: &str) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, HttpError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let slot = attempts.entry(url.to_string()).or_default();
            *slot += 1;
            *slot
        };
        match self.pages.get(url) {
            Some(FetchScript::Succeed(body)) => Ok(FetchedPage {
                final_url: url.to_string(),
                body: body.clone(),
            }),
            Some(FetchScript::FailTimes(failures, body)) if attempt > *failures => {
                Ok(FetchedPage {
                    final_url: url.to_string(),
                    body: body.clone(),
                })
            }
            _ => Err(HttpError::Network("scripted outage".to_string())),
        }
    }
}
