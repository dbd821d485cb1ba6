//! Scripted reply dispatcher for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::SenderId;
use crate::ports::{DispatchError, ReplyDispatcher};

/// Records every reply instead of sending it; can be told to fail.
#[derive(Debug, Default)]
pub struct ScriptedReplyDispatcher {
    sent: Mutex<Vec<(SenderId, String)>>,
    failing: AtomicBool,
}

impl ScriptedReplyDispatcher {
    /// Creates a dispatcher that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent send fail with a platform error.
    pub fn fail_next_sends(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Replies sent so far, in order.
    pub fn sent(&self) -> Vec<(SenderId, String)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Texts sent to the given sender, in order.
    pub fn sent_to(&self, sender: &SenderId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(to, _)| to == sender)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl ReplyDispatcher for ScriptedReplyDispatcher {
    async fn send_reply(&self, sender: &SenderId, text: &str) -> Result<bool, DispatchError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DispatchError::Platform {
                code: 190,
                message: "injected failure".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((sender.clone(), text.to_string()));
        Ok(true)
    }
}
