//! # Embeddings
//!
//! This crate provides embedding generation and nearest-neighbor search
//! for the prepmate retrieval cascade.
//!
//! ## Features
//!
//! - **Embedding Generation**: Convert text to dense vectors via an encoder
//! - **Vector Index**: Flat nearest-neighbor search over stored embeddings
//! - **Index Snapshots**: Documents and vectors persisted as one artifact pair
//! - **Multiple Encoders**: OpenAI API or a deterministic local encoder
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Embeddings System                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingEncoder ──► Embedding ──► VectorIndex                 │
//! │       │                                  │                      │
//! │       ▼                                  ▼                      │
//! │  OpenAI/Hash                       IndexSnapshot                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod encoder;
pub mod error;
pub mod index;
pub mod similarity;
pub mod snapshot;

pub use encoder::{EmbeddingEncoder, HashEncoder, OpenAiEncoder};
pub use error::{EmbeddingError, Result};
pub use index::VectorIndex;
pub use similarity::{distance_to_similarity, l2_distance, normalize};
pub use snapshot::IndexSnapshot;

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Default dimension of embeddings (MiniLM-class encoders).
pub const DEFAULT_DIMENSION: usize = 384;
