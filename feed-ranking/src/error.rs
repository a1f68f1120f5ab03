use thiserror::Error;

/// Result type for feed-ranking operations
pub type Result<T> = std::result::Result<T, RankingError>;

/// A backing store call failed (network, timeout, auth).
///
/// Propagated to the caller unchanged. The engine performs no retries and no
/// silent degradation; retry/backoff and offline fallback belong to the
/// surrounding service layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RetrievalError(pub String);

impl RetrievalError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Ranking engine error taxonomy
#[derive(Debug, Error)]
pub enum RankingError {
    /// A backing store call failed
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    /// The request was rejected before any I/O was attempted
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RankingError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}
