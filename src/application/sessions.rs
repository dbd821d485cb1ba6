//! Per-sender dialogue session slots.
//!
//! Each sender owns one slot holding their completion machine, the pending
//! timeout timer, and an epoch counter. Fragments for one sender serialize
//! on the slot's async mutex; different senders interleave freely.
//!
//! Timer discipline: every fragment aborts the pending timer, and a new one
//! is armed only while the machine keeps buffering. The epoch guards the
//! abort race: a timer that already woke up but belongs to a previous epoch
//! must not flush the buffer.

use std::collections::HashMap;
use std::sync::Mutex as StdMutex;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::domain::dialogue::DialogueFsm;
use crate::domain::foundation::SenderId;

/// How long a buffering sender may stay silent before the utterance is
/// force-completed.
pub const DIALOGUE_TIMEOUT: Duration = Duration::from_secs(10);

/// One sender's dialogue state.
pub struct SessionSlot {
    /// The sender's completion machine.
    pub fsm: DialogueFsm,
    timer: Option<JoinHandle<()>>,
    epoch: u64,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            fsm: DialogueFsm::new(),
            timer: None,
            epoch: 0,
        }
    }

    /// Aborts the pending timer and bumps the epoch, invalidating any timer
    /// task that already woke up. Returns the new epoch for re-arming.
    pub fn cancel_timer(&mut self) -> u64 {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.epoch += 1;
        self.epoch
    }

    /// Installs the timer task for the current epoch.
    pub fn arm_timer(&mut self, timer: JoinHandle<()>) {
        self.timer = Some(timer);
    }

    /// True if the given epoch is still the live one.
    pub fn epoch_is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }
}

/// Registry of per-sender session slots, created lazily.
#[derive(Default)]
pub struct DialogueSessions {
    slots: StdMutex<HashMap<SenderId, Arc<Mutex<SessionSlot>>>>,
}

impl DialogueSessions {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sender's slot, creating it on first contact.
    pub fn slot(&self, sender: &SenderId) -> Arc<Mutex<SessionSlot>> {
        let mut guard = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .entry(sender.clone())
            .or_insert_with(|| Arc::new(Mutex::new(SessionSlot::new())))
            .clone()
    }

    /// Number of senders with a live slot.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True when no sender has contacted us yet.
    pub fn is_empty(&self) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }
}
