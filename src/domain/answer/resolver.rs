//! Maps a classification result to a reply string.
//!
//! A usable result (non-empty category at or above the confidence
//! threshold) drives an exact-label lookup; everything else, including
//! lookup misses and store failures, lands on the reserved fallback
//! label's answer. The resolver never errors toward the end user: its
//! last resort is the classification rendered as JSON.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::classification::ClassificationResult;
use crate::ports::KnowledgeStore;

/// Reserved label whose answer covers everything unclassifiable.
pub const FALLBACK_ANSWER_LABEL: &str = "其他";

/// Canned-answer resolution over the knowledge store.
pub struct AnswerResolver {
    store: Arc<dyn KnowledgeStore>,
}

impl AnswerResolver {
    /// Creates a resolver over the given store.
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self { store }
    }

    /// Resolves a reply string for the classification.
    ///
    /// Unknown categories are treated as ordinary lookup misses falling
    /// through to the fallback label, mirroring the permissiveness of the
    /// classification contract.
    pub async fn resolve(&self, classification: &ClassificationResult) -> String {
        if classification.is_usable() {
            match self.lookup(&classification.category).await {
                Some(answer) => {
                    debug!(category = %classification.category, "exact-label answer resolved");
                    return answer;
                }
                None => {
                    debug!(
                        category = %classification.category,
                        "no answer for classified label; falling back"
                    );
                }
            }
        } else {
            debug!(
                category = %classification.category,
                confidence = classification.confidence,
                "classification below confidence gate; falling back"
            );
        }

        match self.lookup(FALLBACK_ANSWER_LABEL).await {
            Some(answer) => answer,
            None => {
                warn!("fallback answer missing from store; replying with raw classification");
                classification.as_json()
            }
        }
    }

    /// Store lookup with failures collapsed to a miss.
    async fn lookup(&self, label: &str) -> Option<String> {
        match self.store.fetch_answer(label).await {
            Ok(answer) => answer,
            Err(error) => {
                warn!(%error, label, "answer lookup failed; treating as miss");
                None
            }
        }
    }
}
