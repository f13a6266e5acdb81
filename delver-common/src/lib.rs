//! Common types and utilities shared across Delver crates.
//!
//! This crate defines the shared error type, runtime defaults, and
//! observability helpers used throughout the Delver workspace. It is
//! intentionally lightweight so that every crate can depend on it without
//! pulling in heavy transitive costs.
//!
//! # Overview
//!
//! - [`RunLimits`]: per-invocation caps for the scraping pipeline
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`DelverError`] and [`Result`]: shared error handling
use serde::{Deserialize, Serialize};

pub mod observability;

/// Per-invocation caps for one scraping run.
///
/// ```rust
/// use delver_common::RunLimits;
///
/// let limits = RunLimits::default();
/// assert_eq!(limits.max_questions, 5);
/// assert_eq!(limits.max_websites, 3);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunLimits {
    /// Maximum number of initial-question entries to expand.
    pub max_questions: usize,
    /// Maximum number of organic result pages to summarise.
    pub max_websites: usize,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_questions: 5,
            max_websites: 3,
        }
    }
}

/// Error types used across the Delver system.
#[derive(thiserror::Error, Debug)]
pub enum DelverError {
    /// A driver (browser, network) reported an error.
    #[error("driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation exceeded the caller-supplied deadline.
    #[error("deadline exceeded")]
    Deadline,
}

/// Convenient alias for results that use [`DelverError`].
pub type Result<T> = std::result::Result<T, DelverError>;
