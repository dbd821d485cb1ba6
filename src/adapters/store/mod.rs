//! Knowledge store and turn recorder backends.

mod memory;
mod postgres;

pub use memory::{InMemoryKnowledgeStore, InMemoryTurnRecorder};
pub use postgres::{PostgresKnowledgeStore, PostgresTurnRecorder};
