//! Retrying classification pipeline.
//!
//! Drives the classification oracle with the current catalog, validates
//! each answer through the parser, retries malformed output on a fixed
//! budget, and synthesizes the deterministic fallback when the budget is
//! exhausted. This function never fails: every path ends in a
//! `ClassificationResult`.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::ports::ClassificationOracle;

use super::catalog::CategoryCatalogCache;
use super::parser::{parse_classification, ParseOutcome};
use super::result::ClassificationResult;

/// Total oracle attempts before giving up (not retries after the first).
pub const MAX_RETRIES: u32 = 3;

/// Fixed pause between attempts.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Classification driver: oracle + catalog cache + retry policy.
pub struct ClassificationPipeline {
    oracle: Arc<dyn ClassificationOracle>,
    catalog: Arc<CategoryCatalogCache>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl ClassificationPipeline {
    /// Creates a pipeline with the default retry policy.
    pub fn new(oracle: Arc<dyn ClassificationOracle>, catalog: Arc<CategoryCatalogCache>) -> Self {
        Self {
            oracle,
            catalog,
            max_attempts: MAX_RETRIES,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Overrides the delay between attempts (tests).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Obtains a structurally valid classification for the message.
    ///
    /// `history` is the formatted conversation history used as context.
    /// A structurally valid result whose category is outside the current
    /// label set is still returned as-is; membership is the answer
    /// resolver's concern.
    pub async fn classify(&self, history: &str, message: &str) -> ClassificationResult {
        let catalog = self.catalog.current().await;

        for attempt in 1..=self.max_attempts {
            match self
                .oracle
                .classify(history, message, &catalog.options, &catalog.guide)
                .await
            {
                Ok(raw) => match parse_classification(&raw) {
                    ParseOutcome::Valid(result) => {
                        debug!(
                            attempt,
                            category = %result.category,
                            confidence = result.confidence,
                            "classification accepted"
                        );
                        return result;
                    }
                    ParseOutcome::Malformed { raw, reason } => {
                        warn!(attempt, %reason, raw, "classification output malformed");
                    }
                },
                Err(error) => {
                    warn!(attempt, %error, "classification oracle call failed");
                }
            }

            if attempt < self.max_attempts {
                sleep(self.retry_delay).await;
            }
        }

        warn!(
            attempts = self.max_attempts,
            "classification attempts exhausted; using fallback category"
        );
        ClassificationResult::fallback()
    }
}
