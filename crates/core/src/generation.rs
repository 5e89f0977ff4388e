//! Client contract for the text-generation service.
//!
//! The `TextGeneration` trait is the seam between the orchestrator and the
//! network. The session logic only ever sees a prompt going out and raw text
//! or a typed error coming back; tests mock this trait instead of standing up
//! a server.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("generation API returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("generation API returned no usable content")]
    EmptyResponse,
}

impl GenerationError {
    /// Whether a retry with the same request could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Network(_) => true,
            GenerationError::Api { .. } => true,
            GenerationError::EmptyResponse => true,
        }
    }
}

/// One request to the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait TextGeneration {
    /// Sends a prompt and returns the raw generated text.
    async fn complete(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Chat-completions client for an OpenAI-style endpoint.
pub struct GptClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GptClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            model,
        }
    }

    /// Points the client at a non-default endpoint (proxies, test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl TextGeneration for GptClient {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": request.prompt }
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "generation request rejected");
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response.json::<ChatResponse>().await?;
        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or(GenerationError::EmptyResponse)?;
        if content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(content.to_string())
    }
}
