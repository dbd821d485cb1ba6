//! Classification Oracle port - external message-to-category judgment.

use async_trait::async_trait;

use super::OracleError;

/// Port for the external classification judgment.
///
/// Given the formatted conversation history, the latest user message, the
/// currently valid category labels, and a human-readable classification
/// guide, the oracle returns untrusted free text that is *expected* to
/// resemble a two-field JSON object (`category`, `confidence`).
///
/// The raw text is validated by the classification parser, never here; an
/// `Ok` return only means the provider answered, not that the answer is
/// well-formed.
#[async_trait]
pub trait ClassificationOracle: Send + Sync {
    /// Requests a `{category, confidence}` judgment as raw text.
    async fn classify(
        &self,
        history: &str,
        message: &str,
        options: &[String],
        guide: &str,
    ) -> Result<String, OracleError>;
}
