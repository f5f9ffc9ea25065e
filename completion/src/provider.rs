//! Completion providers.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CompletionError, Result};

/// Trait for generative text completers.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Get the name of this completer.
    fn name(&self) -> &str;

    /// Check if the completer is available (API key set, etc.).
    fn is_available(&self) -> bool;

    /// Complete the given prompt, bounded by `max_tokens`.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// OpenAI chat-completions completer.
pub struct OpenAiCompleter {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Model to request.
    model: String,
}

impl OpenAiCompleter {
    /// Create a new OpenAI completer.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            model: "gpt-4o-mini".to_string(),
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
}

impl Default for OpenAiCompleter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Completer for OpenAiCompleter {
    fn name(&self) -> &str {
        "openai"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let api_key = self.api_key.as_ref().ok_or(CompletionError::NotConfigured)?;

        debug!("Requesting completion with model: {}", self.model);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
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

            return Err(CompletionError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CompletionError::ApiRequest(format!(
                "API error: {error_text}"
            )));
        }

        let result: ChatCompletionResponse = response.json().await?;

        let content = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::InvalidResponse("No choices in response".to_string()))?
            .message
            .content;

        debug!("Received completion of {} chars", content.len());
        Ok(content)
    }
}

/// OpenAI chat API response format.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_unconfigured_completer() {
        let completer = OpenAiCompleter {
            api_key: None,
            base_url: "http://localhost".to_string(),
            client: reqwest::Client::new(),
            model: "gpt-4o-mini".to_string(),
        };

        assert!(!completer.is_available());
        let result = completer.complete("hello", 64).await;
        assert!(matches!(result, Err(CompletionError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_complete_parses_first_choice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "A stack is LIFO."}}
                ],
            })))
            .mount(&server)
            .await;

        let completer = OpenAiCompleter::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());

        let content = completer.complete("Explain a stack", 64).await.unwrap();
        assert_eq!(content, "A stack is LIFO.");
    }

    #[tokio::test]
    async fn test_api_error_maps_to_api_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let completer = OpenAiCompleter::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());

        let result = completer.complete("hello", 64).await;
        assert!(matches!(result, Err(CompletionError::ApiRequest(_))));
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let completer = OpenAiCompleter::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());

        let result = completer.complete("hello", 64).await;
        assert!(matches!(result, Err(CompletionError::InvalidResponse(_))));
    }
}
