//! # Completion
//!
//! Generative text completion for the prepmate retrieval cascade. The
//! completer is the last-resort source: slow, unreliable, and called at
//! most once per retrieval. Callers treat a failure here as "no more
//! items", never as a hard error.

pub mod error;
pub mod provider;

pub use error::{CompletionError, Result};
pub use provider::{Completer, OpenAiCompleter};
