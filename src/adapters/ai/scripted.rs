//! Scripted oracle doubles for tests and local development.
//!
//! Configurable to return fixed verdicts, scripted sequences, or errors,
//! with call tracking for verification. No network access.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{ClassificationOracle, CompletenessOracle, OracleError};

/// Scripted completeness oracle.
pub struct ScriptedCompletenessOracle {
    verdicts: Mutex<VecDeque<bool>>,
    default_verdict: Result<bool, ()>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedCompletenessOracle {
    /// Always answers with the same verdict.
    pub fn always(verdict: bool) -> Self {
        Self {
            verdicts: Mutex::new(VecDeque::new()),
            default_verdict: Ok(verdict),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers with the scripted verdicts in order, then repeats the last.
    pub fn sequence(verdicts: impl IntoIterator<Item = bool>) -> Self {
        let queue: VecDeque<bool> = verdicts.into_iter().collect();
        let last = queue.back().copied().unwrap_or(false);
        Self {
            verdicts: Mutex::new(queue),
            default_verdict: Ok(last),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with a network error.
    pub fn failing() -> Self {
        Self {
            verdicts: Mutex::new(VecDeque::new()),
            default_verdict: Err(()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Texts the oracle was asked to judge, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl CompletenessOracle for ScriptedCompletenessOracle {
    async fn is_input_complete(&self, text: &str) -> Result<bool, OracleError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());

        if let Some(verdict) = self
            .verdicts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            return Ok(verdict);
        }
        match self.default_verdict {
            Ok(verdict) => Ok(verdict),
            Err(()) => Err(OracleError::network("scripted failure")),
        }
    }
}

/// One recorded classification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyCall {
    pub history: String,
    pub message: String,
    pub options: Vec<String>,
    pub guide: String,
}

/// Scripted classification oracle.
pub struct ScriptedClassificationOracle {
    replies: Mutex<VecDeque<Result<String, OracleError>>>,
    always_fail: bool,
    calls: Mutex<Vec<ClassifyCall>>,
}

impl ScriptedClassificationOracle {
    /// Answers with the scripted raw texts in order; panics in tests if the
    /// script runs out (an extra call is a test failure worth seeing).
    pub fn replies<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|s| Ok(s.into())).collect()),
            always_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with a provider-unavailable error.
    pub fn always_failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            always_fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of classification calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// The most recent recorded call, if any.
    pub fn last_call(&self) -> Option<ClassifyCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

#[async_trait]
impl ClassificationOracle for ScriptedClassificationOracle {
    async fn classify(
        &self,
        history: &str,
        message: &str,
        options: &[String],
        guide: &str,
    ) -> Result<String, OracleError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ClassifyCall {
                history: history.to_string(),
                message: message.to_string(),
                options: options.to_vec(),
                guide: guide.to_string(),
            });

        if self.always_fail {
            return Err(OracleError::unavailable("scripted failure"));
        }
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::unavailable("script exhausted")))
    }
}
