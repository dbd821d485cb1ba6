//! Completeness Oracle port - external "is this utterance finished" judgment.

use async_trait::async_trait;

use super::OracleError;

/// Port for the external completeness judgment.
///
/// Given the text accumulated so far for one utterance, the oracle decides
/// whether the sender has finished their thought. Implementations call out
/// to an LLM and may be slow or fail; the dialogue state machine treats any
/// error as "not complete" and keeps buffering.
#[async_trait]
pub trait CompletenessOracle: Send + Sync {
    /// Judges whether the accumulated text is a finished utterance.
    async fn is_input_complete(&self, text: &str) -> Result<bool, OracleError>;
}
