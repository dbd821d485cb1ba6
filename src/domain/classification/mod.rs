//! Classification module - bounded-category judgment with retry and fallback.
//!
//! Turns a free-text message into a category from a dynamically supplied
//! label set, tolerating a non-deterministic oracle that may answer with
//! malformed text: strict structural validation, a fixed retry budget, and
//! a deterministic low-confidence fallback.

mod catalog;
mod parser;
mod pipeline;
mod result;

pub use catalog::{CategoryCatalogCache, CACHE_TTL};
pub use parser::{parse_classification, ParseOutcome};
pub use pipeline::{ClassificationPipeline, MAX_RETRIES, RETRY_DELAY};
pub use result::{ClassificationResult, CONFIDENCE_THRESHOLD, FALLBACK_CATEGORY};
