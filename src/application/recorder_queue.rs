//! Background queue in front of the turn recorder.
//!
//! The reply path must never wait on persistence, so resolved turns are
//! pushed onto an unbounded channel and a single worker drains it.
//! Recording failures are logged and dropped. The queue has an explicit
//! lifecycle so tests can flush it deterministically.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::ports::{TurnRecord, TurnRecorder};

/// Handle to the recording worker.
pub struct RecorderQueue {
    sender: mpsc::UnboundedSender<TurnRecord>,
    worker: JoinHandle<()>,
}

impl RecorderQueue {
    /// Spawns the worker draining into the given recorder.
    pub fn spawn(recorder: Arc<dyn TurnRecorder>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<TurnRecord>();
        let worker = tokio::spawn(async move {
            while let Some(turn) = receiver.recv().await {
                match recorder.record_turn(&turn).await {
                    Ok(()) => debug!(turn_id = %turn.id, sender = %turn.sender, "turn recorded"),
                    Err(error) => {
                        warn!(turn_id = %turn.id, %error, "turn recording failed; dropping")
                    }
                }
            }
        });
        Self { sender, worker }
    }

    /// Enqueues one resolved turn. Never blocks; a closed queue is logged
    /// and the turn dropped.
    pub fn enqueue(&self, turn: TurnRecord) {
        if self.sender.send(turn).is_err() {
            warn!("recorder queue closed; dropping turn");
        }
    }

    /// Closes the queue and waits for the worker to drain it.
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(error) = self.worker.await {
            warn!(%error, "recorder worker ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryTurnRecorder;
    use crate::domain::foundation::SenderId;

    fn turn(question: &str) -> TurnRecord {
        TurnRecord::new(SenderId::new("240312").unwrap(), question, "答覆")
    }

    #[tokio::test]
    async fn drains_enqueued_turns_in_order() {
        let recorder = Arc::new(InMemoryTurnRecorder::new());
        let queue = RecorderQueue::spawn(recorder.clone());

        queue.enqueue(turn("第一題"));
        queue.enqueue(turn("第二題"));
        queue.shutdown().await;

        let recorded = recorder.recorded();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].question, "第一題");
        assert_eq!(recorded[1].question, "第二題");
    }

    #[tokio::test]
    async fn recording_failure_does_not_stop_the_worker() {
        let recorder = Arc::new(InMemoryTurnRecorder::new());
        let queue = RecorderQueue::spawn(recorder.clone());

        recorder.fail_next_records();
        queue.enqueue(turn("會失敗"));
        queue.shutdown().await;
        assert!(recorder.recorded().is_empty());

        recorder.recover();
        let queue = RecorderQueue::spawn(recorder.clone());
        queue.enqueue(turn("會成功"));
        queue.shutdown().await;

        let recorded = recorder.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].question, "會成功");
    }
}
