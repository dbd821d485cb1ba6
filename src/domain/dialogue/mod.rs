//! Dialogue module - multi-turn input-completion state machine.
//!
//! Senders often split one logical utterance across several messages.
//! This module decides, per incoming fragment, whether to answer now or
//! keep buffering, combining an external completeness judgment with a
//! local finality heuristic and a timeout-driven forced completion.

mod fsm;
mod heuristics;
mod state;

pub use fsm::{CompletionTrigger, DialogueFsm, InputOutcome};
pub use heuristics::{clean_input, is_final_part};
pub use state::UtteranceState;

/// Prompt returned when the first fragment of an utterance is buffered.
pub const PROMPT_CONTINUE_FIRST: &str = "請繼續補充您的訊息。";

/// Prompt returned when a later fragment still looks unfinished.
pub const PROMPT_CONTINUE_MORE: &str = "看起來還沒說完喔，請繼續補充。";
