//! Error types for the retrieval cascade.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval cascade.
///
/// `retrieve` itself only ever returns [`RetrievalError::InvalidArgument`];
/// source failures mid-cascade are logged and degrade to a smaller result.
/// The remaining variants cover snapshot loading and history persistence.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Caller passed a bad `k` or `threshold`.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Embedding or snapshot error.
    #[error("embedding error: {0}")]
    Embedding(#[from] prepmate_embeddings::EmbeddingError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
