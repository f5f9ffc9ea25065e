//! Retrieved context items and their provenance.

use serde::{Deserialize, Serialize};

/// Sentinel text callers substitute when a retrieval returns nothing.
pub const NO_CONTEXT_SENTINEL: &str = "No relevant context found.";

/// Which source supplied a context item.
///
/// Generated items are fabricated by a model, not retrieved; callers that
/// show context to end users should surface this distinction rather than
/// presenting generated filler as sourced fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// From the local vector index.
    Index,
    /// Extracted from a live web search result.
    Web,
    /// Synthesized by the completer.
    Generated,
}

/// One unit of retrieved context.
///
/// Ephemeral: created per query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextItem {
    text: String,
    provenance: Provenance,
}

impl ContextItem {
    /// Create an index-sourced item.
    pub fn from_index(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provenance: Provenance::Index,
        }
    }

    /// Create a web-sourced item.
    pub fn from_web(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provenance: Provenance::Web,
        }
    }

    /// Create a generated item.
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provenance: Provenance::Generated,
        }
    }

    /// The context text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The source that supplied this item.
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Consume the item, keeping only its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_provenance_ordering() {
        assert!(Provenance::Index < Provenance::Web);
        assert!(Provenance::Web < Provenance::Generated);
    }

    #[test]
    fn test_item_accessors() {
        let item = ContextItem::from_web("a paragraph");
        assert_eq!(item.text(), "a paragraph");
        assert_eq!(item.provenance(), Provenance::Web);
        assert_eq!(item.into_text(), "a paragraph");
    }
}
