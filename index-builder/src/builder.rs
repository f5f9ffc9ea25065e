//! Snapshot building pipeline.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use prepmate_embeddings::snapshot::MAX_DOCUMENT_CHARS;
use prepmate_embeddings::{EmbeddingEncoder, IndexSnapshot};
use prepmate_websearch::SearchProvider;

use crate::error::{BuildError, Result};

/// Default number of search results collected per seed topic.
pub const DEFAULT_RESULTS_PER_TOPIC: usize = 5;

/// Builds index snapshots from seed topics.
///
/// The builder is an offline collaborator of the live cascade: it shares
/// the encoder and search provider contracts but runs as a batch job and
/// never concurrently with a service reading the same snapshot directory.
pub struct IndexBuilder {
    encoder: Arc<dyn EmbeddingEncoder>,
    search: Arc<dyn SearchProvider>,
    results_per_topic: usize,
}

impl IndexBuilder {
    /// Create a builder from an encoder and a search provider.
    pub fn new(encoder: Arc<dyn EmbeddingEncoder>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            encoder,
            search,
            results_per_topic: DEFAULT_RESULTS_PER_TOPIC,
        }
    }

    /// Set how many search results are collected per topic.
    pub fn with_results_per_topic(mut self, results: usize) -> Self {
        self.results_per_topic = results;
        self
    }

    /// Build a snapshot from the given seed topics.
    ///
    /// A topic whose search fails is logged and skipped; duplicate
    /// document texts are dropped before embedding so index capacity is
    /// not wasted on repeats.
    pub async fn build(&self, topics: &[String]) -> Result<IndexSnapshot> {
        if topics.is_empty() {
            return Err(BuildError::NoTopics);
        }

        let mut documents: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for topic in topics {
            let texts = match self.search.search(topic, self.results_per_topic).await {
                Ok(texts) => texts,
                Err(e) => {
                    warn!("Search for topic {topic:?} failed, skipping: {e}");
                    continue;
                }
            };

            for text in texts {
                for document in split_documents(&text) {
                    if seen.insert(document.clone()) {
                        documents.push(document);
                    }
                }
            }
        }

        info!(
            "Collected {} unique documents from {} topics",
            documents.len(),
            topics.len()
        );

        let embeddings = self.encoder.embed_batch(&documents).await?;
        let snapshot =
            IndexSnapshot::from_parts(documents, embeddings, self.encoder.dimension())?;

        Ok(snapshot)
    }
}

/// Split one extracted page text into bounded documents.
///
/// Paragraphs (newline-separated) are kept whole where possible; an
/// oversized paragraph is chopped at the character cap.
fn split_documents(text: &str) -> Vec<String> {
    let mut documents = Vec::new();

    for paragraph in text.lines() {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if paragraph.chars().count() <= MAX_DOCUMENT_CHARS {
            documents.push(paragraph.to_string());
        } else {
            let chars: Vec<char> = paragraph.chars().collect();
            for chunk in chars.chunks(MAX_DOCUMENT_CHARS) {
                documents.push(chunk.iter().collect());
            }
        }
    }

    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use prepmate_embeddings::HashEncoder;
    use prepmate_websearch::SearchError;

    struct StubSearch {
        pages: Vec<String>,
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        fn name(&self) -> &str {
            "stub"
        }
        async fn search(
            &self,
            _query: &str,
            _num_results: usize,
        ) -> prepmate_websearch::Result<Vec<String>> {
            Ok(self.pages.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        fn name(&self) -> &str {
            "failing"
        }
        async fn search(
            &self,
            _query: &str,
            _num_results: usize,
        ) -> prepmate_websearch::Result<Vec<String>> {
            Err(SearchError::QueryFailed("offline".to_string()))
        }
    }

    fn encoder() -> Arc<dyn EmbeddingEncoder> {
        Arc::new(HashEncoder::with_dimension(32))
    }

    #[tokio::test]
    async fn test_build_deduplicates_documents() {
        let search = Arc::new(StubSearch {
            pages: vec![
                "alpha paragraph\nbeta paragraph".to_string(),
                "alpha paragraph\ngamma paragraph".to_string(),
            ],
        });

        let builder = IndexBuilder::new(encoder(), search);
        let snapshot = builder.build(&["topic".to_string()]).await.unwrap();

        assert_eq!(
            snapshot.documents(),
            &[
                "alpha paragraph".to_string(),
                "beta paragraph".to_string(),
                "gamma paragraph".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_build_requires_topics() {
        let builder = IndexBuilder::new(encoder(), Arc::new(StubSearch { pages: Vec::new() }));
        let result = builder.build(&[]).await;
        assert!(matches!(result, Err(BuildError::NoTopics)));
    }

    #[tokio::test]
    async fn test_failed_topic_is_skipped() {
        let builder = IndexBuilder::new(encoder(), Arc::new(FailingSearch));
        let snapshot = builder.build(&["topic".to_string()]).await.unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_paragraph_is_chopped() {
        let long: String = (0..MAX_DOCUMENT_CHARS * 2 + 10)
            .map(|i| char::from(b'a' + (i % 7) as u8))
            .collect();
        let search = Arc::new(StubSearch { pages: vec![long] });

        let builder = IndexBuilder::new(encoder(), search);
        let snapshot = builder.build(&["topic".to_string()]).await.unwrap();

        assert_eq!(snapshot.len(), 3);
        for document in snapshot.documents() {
            assert!(document.chars().count() <= MAX_DOCUMENT_CHARS);
        }
    }

    #[tokio::test]
    async fn test_snapshot_dimension_matches_encoder() {
        let search = Arc::new(StubSearch {
            pages: vec!["one paragraph".to_string()],
        });
        let builder = IndexBuilder::new(encoder(), search);
        let snapshot = builder.build(&["topic".to_string()]).await.unwrap();
        assert_eq!(snapshot.dimension(), 32);
    }

    #[test]
    fn test_split_documents_keeps_paragraphs() {
        let documents = split_documents("first\n\nsecond\nthird");
        assert_eq!(documents, vec!["first", "second", "third"]);
    }
}
