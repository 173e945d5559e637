// OpenAI HTTP client

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use tracing::debug;

use toolbench_core::protocol::{ChatRequest, ChatResponse, ResponsesRequest, ResponsesResponse};
use toolbench_core::{HarnessError, ModelApi, Result};

/// Hosted OpenAI API
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Where and how to reach the model API
#[derive(Clone, PartialEq, Eq)]
pub struct ModelEndpoint {
    pub api_key: String,
    /// Base URL without trailing slash, e.g. `https://api.openai.com/v1`
    pub base_url: String,
}

impl ModelEndpoint {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Use an OpenAI-compatible endpoint instead of the hosted API
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl fmt::Debug for ModelEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEndpoint")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Model API client for OpenAI-compatible endpoints
///
/// # Example
///
/// ```ignore
/// let client = OpenAiClient::new(
///     ModelEndpoint::new(api_key).with_base_url("http://localhost:8000/v1"),
/// );
/// let driver = ConversationDriver::new(client, "gpt-4o", DriverMode::ChatTools);
/// ```
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: ModelEndpoint,
}

impl OpenAiClient {
    pub fn new(endpoint: ModelEndpoint) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &ModelEndpoint {
        &self.endpoint
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.endpoint.url(path);
        debug!(url = %url, "Sending model request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.endpoint.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| HarnessError::llm(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HarnessError::llm(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| HarnessError::llm(format!("Failed to read response: {}", e)))?;
        serde_json::from_str(&text)
            .map_err(|e| HarnessError::llm(format!("Malformed response from {}: {}", path, e)))
    }
}

#[async_trait]
impl ModelApi for OpenAiClient {
    async fn create_response(&self, request: ResponsesRequest) -> Result<ResponsesResponse> {
        self.post("responses", &request).await
    }

    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.post("chat/completions", &request).await
    }
}
