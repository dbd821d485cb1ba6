//! Foundation module - shared value objects and traits.
//!
//! Contains the building blocks used across all domain modules:
//! identifiers, timestamps, the state machine trait, and validation errors.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{SenderId, TurnId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
