//! Bounded per-sender conversation history.
//!
//! Each sender gets a FIFO window of their last few turns, used as context
//! for the next classification call. In-memory only, created lazily, never
//! expired by time. The store is an explicit injectable object so tests can
//! construct and reset it; there is no global state.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::domain::foundation::{SenderId, Timestamp};

/// Maximum turns kept per sender; the oldest is evicted first.
pub const MAX_HISTORY_LENGTH: usize = 5;

/// Placeholder used when a sender has no history yet.
const EMPTY_HISTORY: &str = "無對話歷史";

/// One remembered exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTurn {
    /// What the sender asked.
    pub user_message: String,
    /// What the bot answered.
    pub bot_response: String,
    /// When the turn was recorded.
    pub at: Timestamp,
}

/// The bounded window of one sender's recent turns.
///
/// Eviction is purely by insertion order (FIFO), regardless of access.
#[derive(Debug, Default)]
pub struct ConversationHistory {
    turns: VecDeque<HistoryTurn>,
}

impl ConversationHistory {
    /// Appends a turn, evicting the oldest when the window is full.
    pub fn push(&mut self, user_message: impl Into<String>, bot_response: impl Into<String>) {
        if self.turns.len() == MAX_HISTORY_LENGTH {
            self.turns.pop_front();
        }
        self.turns.push_back(HistoryTurn {
            user_message: user_message.into(),
            bot_response: bot_response.into(),
            at: Timestamp::now(),
        });
    }

    /// Number of remembered turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True if nothing has been remembered yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns in insertion order.
    pub fn turns(&self) -> impl Iterator<Item = &HistoryTurn> {
        self.turns.iter()
    }

    /// Renders the window as prompt context for the classifier.
    pub fn format(&self) -> String {
        if self.turns.is_empty() {
            return EMPTY_HISTORY.to_string();
        }
        self.turns
            .iter()
            .map(|turn| format!("用戶: {}\n機器人: {}", turn.user_message, turn.bot_response))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Process-lifetime store of per-sender histories.
#[derive(Debug, Default)]
pub struct HistoryStore {
    inner: Mutex<HashMap<SenderId, ConversationHistory>>,
}

impl HistoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a resolved turn for the sender, creating their window lazily.
    pub fn record(&self, sender: &SenderId, user_message: &str, bot_response: &str) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .entry(sender.clone())
            .or_default()
            .push(user_message, bot_response);
    }

    /// Formatted history for the sender ("no history" placeholder if none).
    pub fn formatted(&self, sender: &SenderId) -> String {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .get(sender)
            .map(ConversationHistory::format)
            .unwrap_or_else(|| EMPTY_HISTORY.to_string())
    }

    /// Number of turns remembered for the sender.
    pub fn len(&self, sender: &SenderId) -> usize {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.get(sender).map_or(0, ConversationHistory::len)
    }

    /// True when no sender has any history.
    pub fn is_empty(&self) -> bool {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.values().all(ConversationHistory::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(raw: &str) -> SenderId {
        SenderId::new(raw).unwrap()
    }

    mod window {
        use super::*;

        #[test]
        fn keeps_insertion_order() {
            let mut history = ConversationHistory::default();
            history.push("q1", "a1");
            history.push("q2", "a2");

            let questions: Vec<_> = history.turns().map(|t| t.user_message.as_str()).collect();
            assert_eq!(questions, vec!["q1", "q2"]);
        }

        #[test]
        fn evicts_oldest_beyond_cap() {
            let mut history = ConversationHistory::default();
            for i in 0..(MAX_HISTORY_LENGTH + 2) {
                history.push(format!("q{i}"), format!("a{i}"));
            }

            assert_eq!(history.len(), MAX_HISTORY_LENGTH);
            assert_eq!(history.turns().next().unwrap().user_message, "q2");
        }

        #[test]
        fn formats_empty_window_as_placeholder() {
            assert_eq!(ConversationHistory::default().format(), "無對話歷史");
        }

        #[test]
        fn formats_turns_in_prompt_shape() {
            let mut history = ConversationHistory::default();
            history.push("到貨了嗎", "還在路上");

            assert_eq!(history.format(), "用戶: 到貨了嗎\n機器人: 還在路上");
        }
    }

    mod store {
        use super::*;

        #[test]
        fn histories_are_per_sender() {
            let store = HistoryStore::new();
            store.record(&sender("a"), "qa", "aa");
            store.record(&sender("b"), "qb", "ab");

            assert!(store.formatted(&sender("a")).contains("qa"));
            assert!(!store.formatted(&sender("a")).contains("qb"));
        }

        #[test]
        fn unknown_sender_reads_as_empty() {
            let store = HistoryStore::new();
            assert_eq!(store.formatted(&sender("ghost")), "無對話歷史");
            assert_eq!(store.len(&sender("ghost")), 0);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn window_never_exceeds_cap(turns in proptest::collection::vec("\\PC{0,16}", 0..24)) {
                let mut history = ConversationHistory::default();
                for (i, q) in turns.iter().enumerate() {
                    history.push(q.clone(), format!("a{i}"));
                }
                prop_assert!(history.len() <= MAX_HISTORY_LENGTH);
            }

            #[test]
            fn window_keeps_the_most_recent_turns(n in 0usize..24) {
                let mut history = ConversationHistory::default();
                for i in 0..n {
                    history.push(format!("q{i}"), format!("a{i}"));
                }
                if n > 0 {
                    let last = history.turns().last().unwrap();
                    prop_assert_eq!(last.user_message.clone(), format!("q{}", n - 1));
                }
            }
        }
    }
}
