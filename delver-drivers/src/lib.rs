//! Driver layer for browser automation.
//!
//! This crate exposes the WebDriver client wrapper and page/element helpers
//! the collectors use to drive a search results page.
//!
//! - [`engine_browser::driver::EngineDriver`]: WebDriver client wrapper
//! - [`engine_browser::page::EnginePage`]: navigation, waits, and DOM queries
//! - [`engine_browser::pacer::Pacer`]: settle delays and paced typing
pub mod engine_browser;
