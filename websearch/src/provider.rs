//! Search providers.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use regex_lite::Regex;
use tracing::{debug, warn};

use crate::error::{Result, SearchError};
use crate::extract::extract_paragraph_text;

/// Default per-page fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Default character cap for one extracted page text.
pub const DEFAULT_MAX_CHARS: usize = 1000;

/// Default number of pages fetched concurrently.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Trait for web search providers.
///
/// A provider turns a query into up to `num_results` extracted page texts.
/// Individual page failures are absorbed: a failed or timed-out fetch
/// yields zero items, never an error. The returned `Err` is reserved for
/// the search engine query itself failing.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Search the web and return extracted page texts.
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<String>>;
}

/// Search provider backed by the DuckDuckGo HTML endpoint.
pub struct DuckDuckGoProvider {
    /// HTTP client.
    client: reqwest::Client,

    /// Search endpoint base URL.
    base_url: String,

    /// Per-page fetch timeout.
    fetch_timeout: Duration,

    /// Character cap for one extracted page text.
    max_chars: usize,

    /// Number of pages fetched concurrently.
    concurrency: usize,
}

impl DuckDuckGoProvider {
    /// Create a new provider with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://html.duckduckgo.com/html".to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_chars: DEFAULT_MAX_CHARS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the search endpoint base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-page fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the character cap for extracted page text.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Set the number of pages fetched concurrently.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run the search engine query and collect result URLs.
    async fn result_urls(&self, query: &str, num_results: usize) -> Result<Vec<String>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::QueryFailed(format!(
                "search engine returned {}",
                response.status()
            )));
        }

        let html = response.text().await?;
        let urls: Vec<String> = result_link_re()
            .captures_iter(&html)
            .map(|capture| capture[1].to_string())
            .take(num_results)
            .collect();

        debug!("Search for {query:?} yielded {} result URLs", urls.len());
        Ok(urls)
    }

    /// Fetch one page and reduce it to paragraph text.
    ///
    /// Any failure (connection, status, timeout) is logged and mapped to
    /// `None` so the batch keeps going.
    async fn fetch_page(&self, url: &str) -> Option<String> {
        let fetch = async {
            let response = self.client.get(url).send().await?;
            response.error_for_status()?.text().await
        };

        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(html)) => {
                let text = extract_paragraph_text(&html, self.max_chars);
                if text.is_empty() {
                    debug!("No paragraph text in {url}");
                    None
                } else {
                    Some(text)
                }
            }
            Ok(Err(e)) => {
                warn!("Failed to fetch {url}: {e}");
                None
            }
            Err(_) => {
                warn!("Timed out fetching {url}");
                None
            }
        }
    }
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<String>> {
        if num_results == 0 {
            return Ok(Vec::new());
        }

        let urls = self.result_urls(query, num_results).await?;

        // Bounded fan-out; `buffered` keeps the result-page order stable.
        let fetches: Vec<_> = urls.iter().map(|url| self.fetch_page(url)).collect();
        let texts: Vec<String> = futures::stream::iter(fetches)
            .buffered(self.concurrency)
            .filter_map(|text| async move { text })
            .collect()
            .await;

        debug!(
            "Extracted text from {}/{} result pages",
            texts.len(),
            urls.len()
        );
        Ok(texts)
    }
}

#[allow(clippy::expect_used)]
fn result_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<a[^>]+class="[^"]*result__a[^"]*"[^>]+href="([^"]+)""#)
            .expect("static pattern")
    })
}
