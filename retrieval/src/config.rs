//! Configuration for the retrieval cascade.

use serde::{Deserialize, Serialize};

/// Configuration for the retrieval cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Minimum length, in characters, for a generated fragment to be
    /// accepted as a context item.
    pub min_fragment_chars: usize,

    /// Token budget for the single completion request per retrieval.
    pub max_completion_tokens: u32,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            min_fragment_chars: 20,
            max_completion_tokens: 256,
        }
    }
}

impl CascadeConfig {
    /// Set the minimum accepted fragment length.
    pub fn with_min_fragment_chars(mut self, chars: usize) -> Self {
        self.min_fragment_chars = chars;
        self
    }

    /// Set the completion token budget.
    pub fn with_max_completion_tokens(mut self, tokens: u32) -> Self {
        self.max_completion_tokens = tokens;
        self
    }
}
