//! Error types shared by the ports.

use thiserror::Error;

/// Errors from the AI oracles (completeness and classification).
///
/// Callers in the core never surface these to the end user: completeness
/// failures collapse to "not complete", classification failures are retried
/// and finally replaced by the fallback category.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    /// Provider rejected the credentials.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Rate limited by the provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider returned a server-side failure.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    /// Provider response could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
}

impl OracleError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

/// Errors from the category/answer store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Query failed.
    #[error("query failed: {0}")]
    Query(String),
}

/// Errors from the reply dispatch channel.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The messaging platform rejected the send.
    #[error("platform error {code}: {message}")]
    Platform { code: i64, message: String },

    /// Network error during the send.
    #[error("network error: {0}")]
    Network(String),
}
