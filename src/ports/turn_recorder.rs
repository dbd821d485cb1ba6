//! Turn recorder port - the persistence/enrichment sink for resolved turns.

use async_trait::async_trait;

use crate::domain::foundation::{SenderId, Timestamp, TurnId};

use super::StoreError;

/// A resolved conversation turn handed to the persistence sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    /// Unique id of this turn.
    pub id: TurnId,
    /// Who asked.
    pub sender: SenderId,
    /// The full utterance the bot answered.
    pub question: String,
    /// The reply that was resolved for it.
    pub answer: String,
    /// When the turn was resolved.
    pub resolved_at: Timestamp,
}

impl TurnRecord {
    /// Creates a record for a turn resolved now.
    pub fn new(sender: SenderId, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            sender,
            question: question.into(),
            answer: answer.into(),
            resolved_at: Timestamp::now(),
        }
    }
}

/// Port for the conversation persistence & enrichment sink.
///
/// Recording is fire-and-forget from the reply path's point of view:
/// failures are logged by the background queue and never reach the sender.
#[async_trait]
pub trait TurnRecorder: Send + Sync {
    /// Stores (and possibly enriches/indexes) one resolved turn.
    async fn record_turn(&self, turn: &TurnRecord) -> Result<(), StoreError>;
}
