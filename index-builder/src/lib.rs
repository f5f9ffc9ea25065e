//! # Index Builder
//!
//! Offline batch job that produces the index snapshot the live retrieval
//! cascade loads at startup. For each seed topic it runs a web search,
//! splits the extracted page texts into bounded documents, deduplicates
//! them by exact text, embeds the survivors, and publishes the snapshot
//! atomically so a concurrently starting service never observes a
//! half-written artifact pair.

pub mod builder;
pub mod error;

pub use builder::IndexBuilder;
pub use error::{BuildError, Result};
