//! Reply dispatch port - sending the bot's reply back to the sender.

use async_trait::async_trait;

use crate::domain::foundation::SenderId;

use super::DispatchError;

/// Port for the outbound messaging channel.
///
/// Callers must treat `Ok(false)` and `Err` as non-fatal: a failed send is
/// logged and the turn continues (history update, persistence) regardless.
#[async_trait]
pub trait ReplyDispatcher: Send + Sync {
    /// Sends a text reply to the sender. Returns whether the platform
    /// accepted the message.
    async fn send_reply(&self, sender: &SenderId, text: &str) -> Result<bool, DispatchError>;
}
