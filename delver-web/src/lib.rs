//! Search-page scraping pipeline.
//!
//! - Capability traits the core depends on: [`surface::SearchSurface`] /
//!   [`surface::SurfaceProvider`] (browser) and [`extract::PageFetcher`]
//!   (page fetch) — both substitutable by test doubles
//! - Collectors for the "people also ask" question tree (`questions`) and
//!   the top organic result links (`organic`)
//! - Content extraction with a readability-first, DOM-strip-fallback
//!   strategy (`extract`) over normalized text (`clean`)
//! - The sequential orchestrator (`orchestrator`) and the two entry
//!   operations exposed to callers (`service`)

pub mod clean;
pub mod extract;
pub mod live;
pub mod locator;
pub mod organic;
pub mod orchestrator;
pub mod questions;
pub mod service;
pub mod surface;
pub mod types;

pub use service::{SearchService, ServiceError};
pub use types::{QuestionEntry, SearchResult, WebsiteInfo};
