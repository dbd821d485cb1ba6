//! Answer module - confidence-gated canned-answer resolution.

mod resolver;

pub use resolver::{AnswerResolver, FALLBACK_ANSWER_LABEL};
