//! Loader for workspace configuration with YAML + environment overlays.
//!
//! The schema covers the three things an operator actually tunes: where the
//! search engine and WebDriver endpoints live, which CSS selectors identify
//! the question/result widgets (markup drifts, selectors should not be
//! recompiled), and the per-run limits. `${VAR}` placeholders are expanded
//! recursively before deserialisation; `DELVER__`-prefixed environment
//! variables override file values.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct DelverConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub engine: EngineSpec,
    #[serde(default)]
    pub selectors: SelectorSpec,
    #[serde(default)]
    pub limits: LimitSpec,
    #[serde(default)]
    pub fetch: FetchSpec,
}

/// Search engine and WebDriver endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSpec {
    #[serde(default = "default_home_url")]
    pub home_url: String,
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for EngineSpec {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
        }
    }
}

/// CSS selectors for the search page widgets we drive.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorSpec {
    #[serde(default = "default_search_input")]
    pub search_input: String,
    #[serde(default = "default_question")]
    pub question: String,
    #[serde(default = "default_result_block")]
    pub result_block: String,
    #[serde(default = "default_result_link")]
    pub result_link: String,
}

impl Default for SelectorSpec {
    fn default() -> Self {
        Self {
            search_input: default_search_input(),
            question: default_question(),
            result_block: default_result_block(),
            result_link: default_result_link(),
        }
    }
}

/// Per-run caps.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimitSpec {
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    #[serde(default = "default_max_websites")]
    pub max_websites: usize,
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: usize,
}

impl Default for LimitSpec {
    fn default() -> Self {
        Self {
            max_questions: default_max_questions(),
            max_websites: default_max_websites(),
            fetch_retries: default_fetch_retries(),
        }
    }
}

/// Page-fetch tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSpec {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetchSpec {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

fn default_home_url() -> String {
    "https://www.google.com".into()
}
fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}
fn default_headless() -> bool {
    true
}
fn default_search_input() -> String {
    r#"textarea[name="q"]"#.into()
}
fn default_question() -> String {
    "span.CSkcDe".into()
}
fn default_result_block() -> String {
    "div.g".into()
}
fn default_result_link() -> String {
    "a".into()
}
fn default_max_questions() -> usize {
    5
}
fn default_max_websites() -> usize {
    3
}
fn default_fetch_retries() -> usize {
    3
}
fn default_timeout_secs() -> u64 {
    60
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct DelverConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for DelverConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DelverConfigLoader {
    /// Start with sensible defaults: YAML file + `DELVER__` env overrides.
    ///
    /// ```
    /// use delver_config::DelverConfigLoader;
    ///
    /// let config = DelverConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.selectors.question, "span.CSkcDe");
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("DELVER").separator("__"));
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use delver_config::DelverConfigLoader;
    ///
    /// let cfg = DelverConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// version: "test"
    /// selectors:
    ///   question: "div[data-q] span"
    /// limits:
    ///   max_websites: 5
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.selectors.question, "div[data-q] span");
    /// assert_eq!(cfg.limits.max_websites, 5);
    /// assert_eq!(cfg.limits.max_questions, 5);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// YAML snippets, `DELVER__` environment variables, and `${VAR}`
    /// placeholders are all resolved before the strongly typed structs
    /// materialise.
    ///
    /// ```
    /// use delver_config::DelverConfigLoader;
    ///
    /// unsafe { std::env::set_var("WEBDRIVER_PORT", "4444"); }
    ///
    /// let config = DelverConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// engine:
    ///   webdriver_url: "http://localhost:${WEBDRIVER_PORT}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.engine.webdriver_url, "http://localhost:4444");
    /// assert!(config.engine.headless);
    ///
    /// unsafe { std::env::remove_var("WEBDRIVER_PORT"); }
    /// ```
    pub fn load(self) -> Result<DelverConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Convert to serde_json::Value first so placeholders can be expanded
        // regardless of where they sit in the tree.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: DelverConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temp_env;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("ENGINE_HOST", Some("search.example"), || {
            let mut v = json!("https://${ENGINE_HOST}/start");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("https://search.example/start"));
        });
    }

    #[test]
    fn expands_in_nested_objects() {
        temp_env::with_vars(
            [("Q_SEL", Some("span.q")), ("R_SEL", Some("div.r"))],
            || {
                let mut v = json!({
                    "selectors": { "question": "${Q_SEL}", "result_block": "$R_SEL" },
                    "limits": { "max_questions": 5 }
                });
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!({
                        "selectors": { "question": "span.q", "result_block": "div.r" },
                        "limits": { "max_questions": 5 }
                    })
                );
            },
        );
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("PORT", Some("9515")),
                ("HOST", Some("localhost:${PORT}")),
                ("DRIVER", Some("http://${HOST}")),
            ],
            || {
                let mut v = json!("${DRIVER}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("http://localhost:9515"));
            },
        );
    }

    #[test]
    fn stops_on_cycles_and_terminates() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            // We only care that expansion terminates; the depth cap leaves an
            // unresolved placeholder behind.
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("sel-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("sel-${DOES_NOT_EXIST}"));
    }
}
