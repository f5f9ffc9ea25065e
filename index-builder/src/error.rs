//! Error types for index building.

use thiserror::Error;

/// Result type alias for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that can occur while building an index snapshot.
#[derive(Error, Debug)]
pub enum BuildError {
    /// No seed topics were supplied.
    #[error("no seed topics supplied")]
    NoTopics,

    /// Embedding or snapshot error.
    #[error("embedding error: {0}")]
    Embedding(#[from] prepmate_embeddings::EmbeddingError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
