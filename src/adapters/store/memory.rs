//! In-memory knowledge store and turn recorder.
//!
//! Seedable backends for tests and local development, with call tracking
//! and failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{CategoryCatalog, KnowledgeStore, StoreError, TurnRecord, TurnRecorder};

/// Seedable in-memory knowledge store.
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeStore {
    catalog: Mutex<Option<CategoryCatalog>>,
    answers: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
    catalog_fetches: AtomicUsize,
    answer_lookups: Mutex<Vec<String>>,
}

impl InMemoryKnowledgeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the category catalog.
    pub fn set_catalog(&self, options: Vec<String>, guide: impl Into<String>) {
        let mut guard = self.catalog.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(CategoryCatalog::new(options, guide));
    }

    /// Seeds one canned answer.
    pub fn set_answer(&self, label: impl Into<String>, answer: impl Into<String>) {
        self.answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(label.into(), answer.into());
    }

    /// Makes every subsequent fetch fail until cleared.
    pub fn fail_next_fetches(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Clears the failure mode.
    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }

    /// How many times the catalog was fetched.
    pub fn catalog_fetches(&self) -> usize {
        self.catalog_fetches.load(Ordering::SeqCst)
    }

    /// Labels looked up so far, in call order.
    pub fn answer_lookups(&self) -> Vec<String> {
        self.answer_lookups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn fetch_categories(&self) -> Result<CategoryCatalog, StoreError> {
        self.catalog_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        let guard = self.catalog.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard
            .clone()
            .unwrap_or_else(|| CategoryCatalog::new(Vec::new(), "")))
    }

    async fn fetch_answer(&self, category: &str) -> Result<Option<String>, StoreError> {
        self.answer_lookups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(category.to_string());
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        let guard = self.answers.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.get(category).cloned())
    }
}

/// In-memory turn recorder.
#[derive(Debug, Default)]
pub struct InMemoryTurnRecorder {
    turns: Mutex<Vec<TurnRecord>>,
    failing: AtomicBool,
}

impl InMemoryTurnRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent record fail.
    pub fn fail_next_records(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Clears the failure mode.
    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }

    /// Turns recorded so far, in arrival order.
    pub fn recorded(&self) -> Vec<TurnRecord> {
        self.turns.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl TurnRecorder for InMemoryTurnRecorder {
    async fn record_turn(&self, turn: &TurnRecord) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        self.turns
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(turn.clone());
        Ok(())
    }
}
