//! Knowledge store port - category labels, classification guide, canned answers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::StoreError;

/// The current classification vocabulary: valid category labels plus a
/// human-readable guide describing when each label applies.
///
/// The set is dynamic: it is loaded from the store and may change between
/// requests. Order is preserved as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    /// Valid category labels, in store order.
    pub options: Vec<String>,
    /// Rule descriptions keyed by label, rendered as one guide string.
    pub guide: String,
}

impl CategoryCatalog {
    /// Creates a catalog from labels and a guide.
    pub fn new(options: Vec<String>, guide: impl Into<String>) -> Self {
        Self {
            options,
            guide: guide.into(),
        }
    }

    /// Returns true if the catalog carries no labels.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Port for the question-answer store backing classification and resolution.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Fetches the current category labels and classification guide.
    async fn fetch_categories(&self) -> Result<CategoryCatalog, StoreError>;

    /// Looks up the canned answer for an exact category label.
    ///
    /// Returns `Ok(None)` on a miss; unknown labels are misses, not errors.
    async fn fetch_answer(&self, category: &str) -> Result<Option<String>, StoreError>;
}
