//! Outbound messaging adapters.

mod graph_api;
mod scripted;

pub use graph_api::{GraphApiConfig, GraphApiDispatcher};
pub use scripted::ScriptedReplyDispatcher;
