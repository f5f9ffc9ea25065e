//! Embedding encoders.
//!
//! Supports API-backed encoders (OpenAI) and a deterministic local encoder
//! used when no model service is reachable.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::similarity::normalize;

/// Trait for embedding encoders.
///
/// Encoders map free text to fixed-dimension vectors. Output is normalized
/// to unit length so L2 distances stay bounded in [0, 2].
#[async_trait]
pub trait EmbeddingEncoder: Send + Sync {
    /// Get the name of this encoder.
    fn name(&self) -> &str;

    /// The fixed output dimension of this encoder.
    fn dimension(&self) -> usize;

    /// Check if the encoder is available (API key set, etc.).
    fn is_available(&self) -> bool;

    /// Encode the given text into an embedding.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Encode multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        // Default implementation: process sequentially
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}

/// OpenAI embedding encoder.
pub struct OpenAiEncoder {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Model to request.
    model: String,

    /// Output dimension to request.
    dimension: usize,
}

impl OpenAiEncoder {
    /// Create a new OpenAI encoder.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            model: "text-embedding-3-small".to_string(),
            dimension: crate::DEFAULT_DIMENSION,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the requested output dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }
}

impl Default for OpenAiEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingEncoder for OpenAiEncoder {
    fn name(&self) -> &str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(EmbeddingError::EncoderNotConfigured)?;

        debug!("Generating embedding with model: {}", self.model);

        let body = serde_json::json!({
            "input": text,
            "model": self.model,
            "dimensions": self.dimension,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error: {error_text}"
            )));
        }

        let result: OpenAiEmbeddingResponse = response.json().await?;

        let mut embedding = result
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("No embedding in response".to_string()))?
            .embedding;

        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        normalize(&mut embedding);
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or(EmbeddingError::EncoderNotConfigured)?;

        debug!(
            "Generating batch embeddings for {} texts with model: {}",
            texts.len(),
            self.model
        );

        let body = serde_json::json!({
            "input": texts,
            "model": self.model,
            "dimensions": self.dimension,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error: {error_text}"
            )));
        }

        let result: OpenAiEmbeddingResponse = response.json().await?;

        let embeddings: Vec<Embedding> = result
            .data
            .into_iter()
            .map(|item| {
                let mut embedding = item.embedding;
                normalize(&mut embedding);
                embedding
            })
            .collect();

        info!("Generated {} batch embeddings", embeddings.len());
        Ok(embeddings)
    }
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    embedding: Vec<f32>,
}

/// Deterministic local encoder based on feature hashing.
///
/// Tokens are hashed into a fixed number of buckets and the resulting
/// vector is normalized to unit length. The output carries far less
/// semantic signal than a model encoder but is stable across runs, needs
/// no network, and respects the unit-norm contract the similarity
/// conversion depends on.
pub struct HashEncoder {
    dimension: usize,
}

impl HashEncoder {
    /// Create a new hash encoder with the default dimension.
    pub fn new() -> Self {
        Self::with_dimension(crate::DEFAULT_DIMENSION)
    }

    /// Create a new hash encoder with a specific dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }

    fn bucket(&self, token: &str) -> usize {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimension
    }
}

impl Default for HashEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingEncoder for HashEncoder {
    fn name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut embedding = vec![0.0f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = self.bucket(&token.to_lowercase());
            embedding[bucket] += 1.0;
        }

        normalize(&mut embedding);
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_hash_encoder_is_deterministic() {
        let encoder = HashEncoder::with_dimension(32);
        let a = encoder.embed("binary search trees").await.unwrap();
        let b = encoder.embed("binary search trees").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_hash_encoder_output_is_unit_norm() {
        let encoder = HashEncoder::with_dimension(32);
        let embedding = encoder.embed("dynamic programming").await.unwrap();
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_hash_encoder_empty_text_is_zero_vector() {
        let encoder = HashEncoder::with_dimension(8);
        let embedding = encoder.embed("").await.unwrap();
        assert_eq!(embedding, vec![0.0f32; 8]);
    }

    #[tokio::test]
    async fn test_openai_encoder_unconfigured() {
        let encoder = OpenAiEncoder {
            api_key: None,
            base_url: "http://localhost".to_string(),
            client: reqwest::Client::new(),
            model: "text-embedding-3-small".to_string(),
            dimension: 4,
        };

        let result = encoder.embed("hello").await;
        assert!(matches!(result, Err(EmbeddingError::EncoderNotConfigured)));
    }

    #[tokio::test]
    async fn test_openai_encoder_parses_and_normalizes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [3.0, 4.0, 0.0, 0.0], "index": 0}],
                "model": "text-embedding-3-small",
            })))
            .mount(&server)
            .await;

        let encoder = OpenAiEncoder::new()
            .with_api_key("test-key")
            .with_base_url(server.uri())
            .with_dimension(4);

        let embedding = encoder.embed("hello").await.unwrap();
        assert!((embedding[0] - 0.6).abs() < 1e-6);
        assert!((embedding[1] - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_openai_encoder_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let encoder = OpenAiEncoder::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());

        let result = encoder.embed("hello").await;
        assert!(matches!(
            result,
            Err(EmbeddingError::RateLimited {
                retry_after_secs: 7
            })
        ));
    }
}
