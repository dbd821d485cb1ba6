//! Domain layer - the bot's core logic, free of transport and storage concerns.
//!
//! Modules:
//! - `foundation`: shared value objects and traits
//! - `dialogue`: multi-turn input-completion state machine and heuristics
//! - `classification`: retrying classification pipeline, parser, category cache
//! - `answer`: confidence-gated canned-answer resolution
//! - `history`: bounded per-sender conversation history

pub mod answer;
pub mod classification;
pub mod dialogue;
pub mod foundation;
pub mod history;
