//! Utterance lifecycle states.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle of a single logical utterance being assembled from fragments.
///
/// - `Start`: no buffered input yet
/// - `Buffering`: one or more fragments buffered, awaiting more or timeout
/// - `Done`: terminal for the current utterance; the next fragment starts a
///   new cycle via an explicit reset at dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UtteranceState {
    /// Fresh machine, nothing buffered.
    #[default]
    Start,

    /// Partial input buffered, timer armed.
    Buffering,

    /// Current utterance finished (responded or timed out).
    Done,
}

impl UtteranceState {
    /// Returns true if partial input is being held.
    pub fn is_buffering(&self) -> bool {
        matches!(self, Self::Buffering)
    }
}

impl StateMachine for UtteranceState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use UtteranceState::*;
        matches!(
            (self, target),
            // First fragment judged incomplete
            (Start, Buffering) |
            // One-shot complete utterance, no buffering needed
            (Start, Done) |
            // Completion by oracle, heuristic, or timeout
            (Buffering, Done) |
            // Next fragment starts a new utterance cycle
            (Done, Start)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use UtteranceState::*;
        match self {
            Start => vec![Buffering, Done],
            Buffering => vec![Done],
            Done => vec![Start],
        }
    }
}
