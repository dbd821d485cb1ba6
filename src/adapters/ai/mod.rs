//! AI oracle adapters.
//!
//! Two production adapters (Gemini for completeness judgment, an
//! OpenAI-compatible chat API for classification) and scripted doubles
//! used by tests and local development.

mod gemini;
mod openai;
mod scripted;

pub use gemini::{GeminiCompletenessOracle, GeminiConfig};
pub use openai::{OpenAiClassificationOracle, OpenAiConfig};
pub use scripted::{ClassifyCall, ScriptedClassificationOracle, ScriptedCompletenessOracle};
