//! Ports - interfaces to external collaborators.
//!
//! Each port abstracts one collaborator the core logic depends on:
//! the two AI oracles, the question-answer store, the reply channel,
//! and the conversation persistence sink. Adapters implement these
//! traits; domain and application code depend only on the traits.

mod classification_oracle;
mod completeness_oracle;
mod errors;
mod knowledge_store;
mod reply_dispatcher;
mod turn_recorder;

pub use classification_oracle::ClassificationOracle;
pub use completeness_oracle::CompletenessOracle;
pub use errors::{DispatchError, OracleError, StoreError};
pub use knowledge_store::{CategoryCatalog, KnowledgeStore};
pub use reply_dispatcher::ReplyDispatcher;
pub use turn_recorder::{TurnRecord, TurnRecorder};
