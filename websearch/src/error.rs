//! Error types for web search.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during web search.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The search engine query itself failed.
    #[error("search query failed: {0}")]
    QueryFailed(String),

    /// The search engine response could not be parsed.
    #[error("invalid search response: {0}")]
    InvalidResponse(String),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
