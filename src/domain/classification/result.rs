//! Classification result value object.

use serde::{Deserialize, Serialize};

/// Minimum confidence for a classification to drive an exact-label answer.
pub const CONFIDENCE_THRESHOLD: f32 = 0.85;

/// Category synthesized when every classification attempt fails.
pub const FALLBACK_CATEGORY: &str = "unknown";

/// A validated `{category, confidence}` judgment.
///
/// `category` is whatever string the oracle produced; membership in the
/// currently valid label set is deliberately not checked here. Unknown
/// labels surface downstream as answer-lookup misses and fall through to
/// the fallback answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Category label as produced by the oracle.
    pub category: String,
    /// Oracle's self-reported confidence, nominally in [0, 1].
    pub confidence: f32,
}

impl ClassificationResult {
    /// Creates a result.
    pub fn new(category: impl Into<String>, confidence: f32) -> Self {
        Self {
            category: category.into(),
            confidence,
        }
    }

    /// Deterministic result used when the retry budget is exhausted.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_CATEGORY, 0.0)
    }

    /// True if this result may drive an exact-label answer lookup.
    ///
    /// Anything else is treated as low confidence and routed to the
    /// fallback answer.
    pub fn is_usable(&self) -> bool {
        !self.category.is_empty() && self.confidence >= CONFIDENCE_THRESHOLD
    }

    /// Renders the result as its JSON text, the last-resort reply when even
    /// the fallback answer lookup misses.
    pub fn as_json(&self) -> String {
        serde_json::json!({
            "category": self.category,
            "confidence": self.confidence,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_requires_category_and_threshold() {
        assert!(ClassificationResult::new("shipping", 0.9).is_usable());
        assert!(ClassificationResult::new("shipping", 0.85).is_usable());
        assert!(!ClassificationResult::new("shipping", 0.5).is_usable());
        assert!(!ClassificationResult::new("", 0.99).is_usable());
    }

    #[test]
    fn fallback_is_unknown_at_zero_confidence() {
        let fallback = ClassificationResult::fallback();
        assert_eq!(fallback.category, "unknown");
        assert_eq!(fallback.confidence, 0.0);
        assert!(!fallback.is_usable());
    }

    #[test]
    fn json_rendering_carries_both_fields() {
        let json = ClassificationResult::new("退貨", 0.5).as_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["category"], "退貨");
        assert!((value["confidence"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    }
}
