//! Inbound message orchestration.
//!
//! One handler instance drives the full turn for every sender: normalize
//! the fragment, feed the sender's completion machine, and once an
//! utterance completes, classify it against the live catalog, resolve a
//! canned answer, reply, remember the turn, and hand it to the recording
//! queue. Everything after completion is best-effort toward the sender:
//! dispatch and persistence failures are logged, never surfaced.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::answer::AnswerResolver;
use crate::domain::classification::ClassificationPipeline;
use crate::domain::dialogue::{clean_input, InputOutcome};
use crate::domain::foundation::SenderId;
use crate::domain::history::HistoryStore;
use crate::ports::{CompletenessOracle, ReplyDispatcher, TurnRecord};

use super::recorder_queue::RecorderQueue;
use super::sessions::{DialogueSessions, SessionSlot, DIALOGUE_TIMEOUT};

/// Fixed reply for stickers, images and other non-text payloads.
const ATTACHMENT_ONLY_REPLY: &str = "我收到了您的訊息，但目前只能回應文字內容。";

/// Orchestrates one sender turn from webhook event to recorded answer.
pub struct InboundMessageHandler {
    sessions: DialogueSessions,
    timeout: Duration,
    completeness: Arc<dyn CompletenessOracle>,
    pipeline: ClassificationPipeline,
    resolver: AnswerResolver,
    history: Arc<HistoryStore>,
    dispatcher: Arc<dyn ReplyDispatcher>,
    recorder: RecorderQueue,
}

impl InboundMessageHandler {
    /// Creates a handler with the default dialogue timeout.
    pub fn new(
        completeness: Arc<dyn CompletenessOracle>,
        pipeline: ClassificationPipeline,
        resolver: AnswerResolver,
        history: Arc<HistoryStore>,
        dispatcher: Arc<dyn ReplyDispatcher>,
        recorder: RecorderQueue,
    ) -> Self {
        Self {
            sessions: DialogueSessions::new(),
            timeout: DIALOGUE_TIMEOUT,
            completeness,
            pipeline,
            resolver,
            history,
            dispatcher,
            recorder,
        }
    }

    /// Overrides the dialogue timeout (tests).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Handles one text fragment from the sender.
    pub async fn handle_text(self: &Arc<Self>, sender: &SenderId, raw_text: &str) {
        let cleaned = clean_input(raw_text);
        if cleaned.is_empty() {
            debug!(sender = %sender, "fragment empty after normalization; ignoring");
            return;
        }

        let slot = self.sessions.slot(sender);
        let mut guard = slot.lock().await;
        let epoch = guard.cancel_timer();

        match guard.fsm.handle_input(&cleaned, self.completeness.as_ref()).await {
            InputOutcome::Complete { utterance, trigger } => {
                drop(guard);
                debug!(sender = %sender, ?trigger, "utterance complete");
                self.respond(sender, &utterance).await;
            }
            InputOutcome::Pending { prompt } => {
                let handler = Arc::clone(self);
                let timer_sender = sender.clone();
                let timer_slot = Arc::clone(&slot);
                guard.arm_timer(tokio::spawn(async move {
                    tokio::time::sleep(handler.timeout).await;
                    handler.flush_on_timeout(timer_sender, timer_slot, epoch).await;
                }));
                drop(guard);
                self.deliver(sender, prompt).await;
            }
        }
    }

    /// Handles a non-text message with the fixed text-only reply.
    pub async fn handle_attachment(&self, sender: &SenderId, attachment_type: &str) {
        info!(sender = %sender, attachment_type, "non-text message received");
        self.deliver(sender, ATTACHMENT_ONLY_REPLY).await;
    }

    /// Timer continuation: flush the buffered utterance if the sender went
    /// silent and no newer fragment re-armed the timer.
    async fn flush_on_timeout(
        &self,
        sender: SenderId,
        slot: Arc<Mutex<SessionSlot>>,
        epoch: u64,
    ) {
        let utterance = {
            let mut guard = slot.lock().await;
            if !guard.epoch_is_current(epoch) {
                return;
            }
            match guard.fsm.force_timeout() {
                Some(InputOutcome::Complete { utterance, .. }) => utterance,
                _ => return,
            }
        };
        debug!(sender = %sender, "dialogue timeout; answering buffered utterance");
        self.respond(&sender, &utterance).await;
    }

    /// Classifies and answers one completed utterance.
    async fn respond(&self, sender: &SenderId, utterance: &str) {
        let history = self.history.formatted(sender);
        let classification = self.pipeline.classify(&history, utterance).await;
        let answer = self.resolver.resolve(&classification).await;

        self.deliver(sender, &answer).await;
        self.history.record(sender, utterance, &answer);
        self.recorder
            .enqueue(TurnRecord::new(sender.clone(), utterance, answer));
    }

    /// Best-effort outbound send.
    async fn deliver(&self, sender: &SenderId, text: &str) {
        match self.dispatcher.send_reply(sender, text).await {
            Ok(true) => {}
            Ok(false) => warn!(sender = %sender, "platform did not accept the reply"),
            Err(error) => warn!(sender = %sender, %error, "reply dispatch failed"),
        }
    }
}
