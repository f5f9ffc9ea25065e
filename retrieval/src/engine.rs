//! The retrieval cascade implementation.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use prepmate_completion::Completer;
use prepmate_embeddings::{EmbeddingEncoder, IndexSnapshot, distance_to_similarity};
use prepmate_websearch::SearchProvider;

use crate::config::CascadeConfig;
use crate::context::ContextItem;
use crate::error::{Result, RetrievalError};

/// The context-retrieval cascade.
///
/// Holds shared, read-only handles to its three sources. A cascade is
/// cheap to share across concurrent callers: nothing is mutated after
/// construction and each `retrieve` call keeps its own quota state.
///
/// Every source is optional. A missing snapshot, provider, or completer
/// simply removes that stage from the cascade; `retrieve` degrades to
/// whatever the remaining stages supply.
pub struct RetrievalCascade {
    /// The loaded index snapshot, if any.
    snapshot: Option<Arc<IndexSnapshot>>,

    /// Query encoder for index search.
    encoder: Option<Arc<dyn EmbeddingEncoder>>,

    /// Live web search fallback.
    search: Option<Arc<dyn SearchProvider>>,

    /// Last-resort generative source.
    completer: Option<Arc<dyn Completer>>,

    /// Cascade configuration.
    config: CascadeConfig,
}

impl RetrievalCascade {
    /// Create a new cascade builder.
    pub fn builder() -> RetrievalCascadeBuilder {
        RetrievalCascadeBuilder::new()
    }

    /// Load an index snapshot, degrading to `None` on failure.
    ///
    /// A missing or corrupt snapshot is not fatal to the live service; the
    /// cascade falls straight through to web search without it.
    pub async fn load_snapshot(dir: impl AsRef<Path>) -> Option<Arc<IndexSnapshot>> {
        match IndexSnapshot::load(dir.as_ref()).await {
            Ok(snapshot) => Some(Arc::new(snapshot)),
            Err(e) => {
                warn!("Index snapshot unavailable at {}: {e}", dir.as_ref().display());
                None
            }
        }
    }

    /// Retrieve up to `k` context items relevant to `query`.
    ///
    /// Sources are consulted in order: vector index, web search, then
    /// generated content, each only for the shortfall the previous stages
    /// left. Index-sourced items precede web-sourced items precede
    /// generated items; there is no cross-source re-ranking.
    ///
    /// Index results are accepted only when their similarity meets
    /// `threshold` and are deduplicated by exact text within the call.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::InvalidArgument`] for `k == 0` or a
    /// `threshold` outside `[0, 1]`. Source failures never surface here;
    /// they are logged and the call returns whatever was accumulated,
    /// possibly an empty list.
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
        threshold: f32,
    ) -> Result<Vec<ContextItem>> {
        if k == 0 {
            return Err(RetrievalError::InvalidArgument(
                "k must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RetrievalError::InvalidArgument(format!(
                "threshold must be within [0, 1], got {threshold}"
            )));
        }

        let mut items: Vec<ContextItem> = Vec::with_capacity(k);

        self.index_stage(query, k, threshold, &mut items).await;

        if items.len() < k {
            self.web_stage(query, k, &mut items).await;
        }

        if items.len() < k {
            self.generation_stage(query, k, &mut items).await;
        }

        debug!(
            "Retrieved {}/{k} context items for query {query:?}",
            items.len()
        );
        Ok(items)
    }

    /// Consult the vector index, accepting items at or above `threshold`.
    async fn index_stage(
        &self,
        query: &str,
        k: usize,
        threshold: f32,
        items: &mut Vec<ContextItem>,
    ) {
        let Some(snapshot) = &self.snapshot else {
            debug!("No index snapshot loaded, skipping index stage");
            return;
        };
        let Some(encoder) = &self.encoder else {
            debug!("No encoder configured, skipping index stage");
            return;
        };

        let query_embedding = match encoder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Query encoding failed, skipping index stage: {e}");
                return;
            }
        };

        let (distances, positions) = match snapshot.search(&query_embedding, k) {
            Ok(results) => results,
            Err(e) => {
                warn!("Index search failed, skipping index stage: {e}");
                return;
            }
        };

        let mut seen: HashSet<&str> = HashSet::new();
        for (distance, position) in distances.iter().zip(positions.iter()) {
            let similarity = distance_to_similarity(*distance);
            if similarity < threshold {
                continue;
            }
            let Some(text) = snapshot.document(*position) else {
                continue;
            };
            if seen.insert(text) {
                items.push(ContextItem::from_index(text));
            }
        }

        debug!("Index stage accepted {} items", items.len());
    }

    /// Ask the web search provider for the remaining shortfall.
    async fn web_stage(&self, query: &str, k: usize, items: &mut Vec<ContextItem>) {
        let Some(search) = &self.search else {
            debug!("No search provider configured, skipping web stage");
            return;
        };

        let shortfall = k - items.len();
        match search.search(query, shortfall).await {
            Ok(texts) => {
                for text in texts {
                    if items.len() >= k {
                        break;
                    }
                    items.push(ContextItem::from_web(text));
                }
            }
            Err(e) => {
                warn!("Web search failed, skipping web stage: {e}");
            }
        }
    }

    /// Synthesize the remaining shortfall with one completion request.
    async fn generation_stage(&self, query: &str, k: usize, items: &mut Vec<ContextItem>) {
        let Some(completer) = &self.completer else {
            debug!("No completer configured, skipping generation stage");
            return;
        };
        if !completer.is_available() {
            debug!("Completer unavailable, skipping generation stage");
            return;
        }

        let shortfall = k - items.len();
        let prompt = format!(
            "Provide {shortfall} short, factual study notes relevant to: {query}\n\
             Write one note per line, with no numbering."
        );

        match completer
            .complete(&prompt, self.config.max_completion_tokens)
            .await
        {
            Ok(response) => {
                for fragment in split_fragments(&response) {
                    if items.len() >= k {
                        break;
                    }
                    if fragment.chars().count() >= self.config.min_fragment_chars {
                        items.push(ContextItem::generated(fragment));
                    }
                }
            }
            Err(e) => {
                warn!("Generation failed, returning accumulated items: {e}");
            }
        }
    }
}

/// Split a completion response into candidate fragments.
///
/// One fragment per non-empty line, with leading list markers stripped so
/// a model that numbers its answers anyway still yields clean text.
fn split_fragments(response: &str) -> Vec<String> {
    response
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix("- ").unwrap_or(line);
    let line = line.strip_prefix("* ").unwrap_or(line);
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(". ") {
            return rest.trim();
        }
    }
    line
}

/// Builder for the retrieval cascade.
pub struct RetrievalCascadeBuilder {
    snapshot: Option<Arc<IndexSnapshot>>,
    encoder: Option<Arc<dyn EmbeddingEncoder>>,
    search: Option<Arc<dyn SearchProvider>>,
    completer: Option<Arc<dyn Completer>>,
    config: CascadeConfig,
}

impl RetrievalCascadeBuilder {
    /// Create a new builder with no sources configured.
    pub fn new() -> Self {
        Self {
            snapshot: None,
            encoder: None,
            search: None,
            completer: None,
            config: CascadeConfig::default(),
        }
    }

    /// Set the index snapshot.
    pub fn with_snapshot(mut self, snapshot: Arc<IndexSnapshot>) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Set the query encoder.
    pub fn with_encoder(mut self, encoder: Arc<dyn EmbeddingEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Set the web search provider.
    pub fn with_search_provider(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    /// Set the completer.
    pub fn with_completer(mut self, completer: Arc<dyn Completer>) -> Self {
        self.completer = Some(completer);
        self
    }

    /// Set the cascade configuration.
    pub fn with_config(mut self, config: CascadeConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the cascade.
    pub fn build(self) -> RetrievalCascade {
        RetrievalCascade {
            snapshot: self.snapshot,
            encoder: self.encoder,
            search: self.search,
            completer: self.completer,
            config: self.config,
        }
    }
}

impl Default for RetrievalCascadeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
