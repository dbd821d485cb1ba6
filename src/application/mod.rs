//! Application layer - orchestration between the domain and the adapters.

mod inbound;
mod recorder_queue;
mod sessions;

pub use inbound::InboundMessageHandler;
pub use recorder_queue::RecorderQueue;
pub use sessions::{DialogueSessions, DIALOGUE_TIMEOUT};
