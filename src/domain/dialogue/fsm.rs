//! Dialogue completion state machine.
//!
//! Owns the fragment buffer for one sender and decides, per fragment,
//! whether the utterance is complete. Completion comes from the oracle,
//! from the local finality heuristic, or from a timeout forced by the
//! session layer (the machine itself holds no timer).

use tracing::{debug, warn};

use crate::domain::foundation::StateMachine;
use crate::ports::CompletenessOracle;

use super::heuristics::is_final_part;
use super::state::UtteranceState;
use super::{PROMPT_CONTINUE_FIRST, PROMPT_CONTINUE_MORE};

/// What ended (or will end) the current utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionTrigger {
    /// The completeness oracle judged the joined text finished.
    Oracle,
    /// The local heuristic matched on the latest fragment.
    FinalHeuristic,
    /// No further input arrived before the dialogue timeout.
    Timeout,
}

/// Outcome of feeding one fragment to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// The utterance is complete; respond now with the joined text.
    Complete {
        /// All buffered fragments plus the final one, in arrival order,
        /// concatenated without separators.
        utterance: String,
        /// What ended the utterance.
        trigger: CompletionTrigger,
    },
    /// Still buffering; reply with a prompt to continue (or stay silent).
    Pending {
        /// Gentle nudge asking the sender to finish their thought.
        prompt: &'static str,
    },
}

impl InputOutcome {
    /// Returns true if the caller should generate a real answer now.
    pub fn should_respond(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

/// Per-sender input-completion state machine.
///
/// Not safe for concurrent `handle_input` calls on the same instance;
/// callers serialize per sender (the session layer wraps each machine in
/// its own async mutex). Fragments must be fed in arrival order, since the
/// buffered utterance is their order-sensitive concatenation.
#[derive(Debug, Default)]
pub struct DialogueFsm {
    state: UtteranceState,
    buffer: Vec<String>,
}

impl DialogueFsm {
    /// Creates a fresh machine in the `Start` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> UtteranceState {
        self.state
    }

    /// Number of fragments currently buffered.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Feeds one fragment and decides whether to respond or keep waiting.
    ///
    /// Oracle failures collapse to "not complete" so a flaky judge can only
    /// delay a response (until the heuristic or the timeout ends the
    /// utterance), never drop one.
    pub async fn handle_input(
        &mut self,
        fragment: &str,
        oracle: &dyn CompletenessOracle,
    ) -> InputOutcome {
        // `Done` is left over from the previous utterance: reset once and
        // treat this fragment as the start of a new cycle. Explicit loop
        // bounded to a single iteration, not recursion.
        if self.state == UtteranceState::Done {
            self.reset();
        }

        let mut combined = self.buffer.concat();
        combined.push_str(fragment);

        let oracle_complete = match oracle.is_input_complete(&combined).await {
            Ok(verdict) => verdict,
            Err(error) => {
                warn!(%error, "completeness oracle failed; treating input as incomplete");
                false
            }
        };

        if oracle_complete || is_final_part(fragment) {
            let trigger = if oracle_complete {
                CompletionTrigger::Oracle
            } else {
                CompletionTrigger::FinalHeuristic
            };
            self.complete();
            debug!(?trigger, chars = combined.chars().count(), "utterance complete");
            return InputOutcome::Complete {
                utterance: combined,
                trigger,
            };
        }

        let prompt = if self.buffer.is_empty() {
            PROMPT_CONTINUE_FIRST
        } else {
            PROMPT_CONTINUE_MORE
        };
        self.buffer.push(fragment.to_string());
        self.state = self
            .state
            .transition_to(UtteranceState::Buffering)
            .unwrap_or(UtteranceState::Buffering);
        InputOutcome::Pending { prompt }
    }

    /// Forces completion of a buffered utterance after the dialogue timeout.
    ///
    /// Returns `None` unless the machine is actually buffering: a timer that
    /// fires late (after the utterance already completed) is a no-op.
    pub fn force_timeout(&mut self) -> Option<InputOutcome> {
        if !self.state.is_buffering() {
            return None;
        }
        let utterance = self.buffer.concat();
        self.complete();
        Some(InputOutcome::Complete {
            utterance,
            trigger: CompletionTrigger::Timeout,
        })
    }

    /// Marks the current utterance finished and drops its buffer.
    fn complete(&mut self) {
        self.buffer.clear();
        self.state = self
            .state
            .transition_to(UtteranceState::Done)
            .unwrap_or(UtteranceState::Done);
    }

    /// Clears all state back to `Start`.
    fn reset(&mut self) {
        self.state = UtteranceState::Start;
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::ScriptedCompletenessOracle;

    mod single_fragment {
        use super::*;

        #[tokio::test]
        async fn oracle_complete_responds_without_buffering() {
            let oracle = ScriptedCompletenessOracle::always(true);
            let mut fsm = DialogueFsm::new();

            let outcome = fsm.handle_input("帽子還沒到貨", &oracle).await;

            assert_eq!(
                outcome,
                InputOutcome::Complete {
                    utterance: "帽子還沒到貨".to_string(),
                    trigger: CompletionTrigger::Oracle,
                }
            );
            assert_eq!(fsm.buffered_len(), 0);
            assert_eq!(fsm.state(), UtteranceState::Done);
        }

        #[tokio::test]
        async fn incomplete_fragment_is_buffered() {
            let oracle = ScriptedCompletenessOracle::always(false);
            let mut fsm = DialogueFsm::new();

            let outcome = fsm.handle_input("太誇張了", &oracle).await;

            assert_eq!(
                outcome,
                InputOutcome::Pending {
                    prompt: PROMPT_CONTINUE_FIRST
                }
            );
            assert_eq!(fsm.state(), UtteranceState::Buffering);
            assert_eq!(fsm.buffered_len(), 1);
        }

        #[tokio::test]
        async fn heuristic_overrides_incomplete_oracle() {
            let oracle = ScriptedCompletenessOracle::always(false);
            let mut fsm = DialogueFsm::new();

            let outcome = fsm.handle_input("就這樣", &oracle).await;

            assert_eq!(
                outcome,
                InputOutcome::Complete {
                    utterance: "就這樣".to_string(),
                    trigger: CompletionTrigger::FinalHeuristic,
                }
            );
        }
    }

    mod buffered_sequences {
        use super::*;

        #[tokio::test]
        async fn closing_keyword_flushes_buffer_in_arrival_order() {
            let oracle = ScriptedCompletenessOracle::always(false);
            let mut fsm = DialogueFsm::new();

            let first = fsm.handle_input("It's", &oracle).await;
            let second = fsm.handle_input("too expensive", &oracle).await;
            let third = fsm.handle_input("thanks", &oracle).await;

            assert!(!first.should_respond());
            assert!(!second.should_respond());
            assert_eq!(
                third,
                InputOutcome::Complete {
                    utterance: "It'stoo expensivethanks".to_string(),
                    trigger: CompletionTrigger::FinalHeuristic,
                }
            );
        }

        #[tokio::test]
        async fn later_fragments_get_the_still_talking_prompt() {
            let oracle = ScriptedCompletenessOracle::always(false);
            let mut fsm = DialogueFsm::new();

            fsm.handle_input("還有就是", &oracle).await;
            let outcome = fsm.handle_input("帽子很多都沒", &oracle).await;

            assert_eq!(
                outcome,
                InputOutcome::Pending {
                    prompt: PROMPT_CONTINUE_MORE
                }
            );
            assert_eq!(fsm.buffered_len(), 2);
        }

        #[tokio::test]
        async fn oracle_judges_the_joined_buffer() {
            // Incomplete for the first fragment, complete once joined.
            let oracle = ScriptedCompletenessOracle::sequence([false, true]);
            let mut fsm = DialogueFsm::new();

            fsm.handle_input("帽子", &oracle).await;
            let outcome = fsm.handle_input("很多都沒到貨", &oracle).await;

            assert_eq!(
                outcome,
                InputOutcome::Complete {
                    utterance: "帽子很多都沒到貨".to_string(),
                    trigger: CompletionTrigger::Oracle,
                }
            );
            assert_eq!(oracle.calls().last().unwrap(), "帽子很多都沒到貨");
        }
    }

    mod oracle_failures {
        use super::*;

        #[tokio::test]
        async fn oracle_error_keeps_buffering() {
            let oracle = ScriptedCompletenessOracle::failing();
            let mut fsm = DialogueFsm::new();

            let outcome = fsm.handle_input("商品", &oracle).await;

            assert!(!outcome.should_respond());
            assert_eq!(fsm.state(), UtteranceState::Buffering);
        }

        #[tokio::test]
        async fn heuristic_finality_survives_oracle_error() {
            let oracle = ScriptedCompletenessOracle::failing();
            let mut fsm = DialogueFsm::new();

            let outcome = fsm.handle_input("商品到了嗎？", &oracle).await;

            assert_eq!(
                outcome,
                InputOutcome::Complete {
                    utterance: "商品到了嗎？".to_string(),
                    trigger: CompletionTrigger::FinalHeuristic,
                }
            );
        }
    }

    mod resets {
        use super::*;

        #[tokio::test]
        async fn next_fragment_after_done_starts_a_new_utterance() {
            let oracle = ScriptedCompletenessOracle::always(true);
            let mut fsm = DialogueFsm::new();

            fsm.handle_input("第一個問題", &oracle).await;
            assert_eq!(fsm.state(), UtteranceState::Done);

            let outcome = fsm.handle_input("第二個問題", &oracle).await;
            assert_eq!(
                outcome,
                InputOutcome::Complete {
                    utterance: "第二個問題".to_string(),
                    trigger: CompletionTrigger::Oracle,
                }
            );
        }

        #[tokio::test]
        async fn force_timeout_flushes_buffer_once() {
            let oracle = ScriptedCompletenessOracle::always(false);
            let mut fsm = DialogueFsm::new();

            fsm.handle_input("太誇張了", &oracle).await;
            fsm.handle_input("帽子很多都沒到貨", &oracle).await;

            let flushed = fsm.force_timeout();
            assert_eq!(
                flushed,
                Some(InputOutcome::Complete {
                    utterance: "太誇張了帽子很多都沒到貨".to_string(),
                    trigger: CompletionTrigger::Timeout,
                })
            );
            // Late-firing timer is a no-op.
            assert_eq!(fsm.force_timeout(), None);
        }

        #[tokio::test]
        async fn force_timeout_without_buffer_is_noop() {
            let mut fsm = DialogueFsm::new();
            assert_eq!(fsm.force_timeout(), None);
        }
    }
}
