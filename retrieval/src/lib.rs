//! # Retrieval Cascade
//!
//! This crate provides the context-retrieval core of prepmate: given a
//! query, return up to `k` relevant context items by consulting, in order,
//!
//! - **Vector Index**: the cheap, precise local source
//! - **Web Search**: the slow, best-effort fallback
//! - **Completion**: last-resort generated content
//!
//! Each source is consulted only if the ones before it under-supplied the
//! requested quota.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Retrieval Cascade                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │   query ──► ┌──────────────┐   short?  ┌──────────────┐         │
//! │             │ Vector Index │ ────────► │  Web Search  │         │
//! │             └──────────────┘           └──────────────┘         │
//! │                                               │ short?          │
//! │                                               ▼                 │
//! │                                        ┌──────────────┐         │
//! │                                        │  Completion  │         │
//! │                                        └──────────────┘         │
//! │                                               │                 │
//! │                     ordered context items ◄───┘                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use prepmate_retrieval::RetrievalCascade;
//!
//! let cascade = RetrievalCascade::builder()
//!     .with_snapshot(snapshot)
//!     .with_encoder(encoder)
//!     .with_search_provider(provider)
//!     .build();
//!
//! let items = cascade.retrieve("explain hash maps", 5, 0.5).await?;
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod history;

pub use config::CascadeConfig;
pub use context::{ContextItem, NO_CONTEXT_SENTINEL, Provenance};
pub use engine::RetrievalCascade;
pub use error::{Result, RetrievalError};
pub use history::{PerformanceLog, PerformanceRecord};

// Re-export from dependencies for convenience
pub use prepmate_completion::Completer;
pub use prepmate_embeddings::{EmbeddingEncoder, IndexSnapshot};
pub use prepmate_websearch::SearchProvider;
