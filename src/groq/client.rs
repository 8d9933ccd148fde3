use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use super::error::GroqError;
use super::types::{ChatRequest, ChatResponse};

pub const API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Anything that can answer a chat completion request.
///
/// Implemented by [`GroqClient`] and by scripted senders in tests.
pub trait ChatSender {
    async fn send_chat(&self, req: &ChatRequest) -> Result<ChatResponse, GroqError>;
}

pub struct GroqClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl GroqClient {
    /// Create a client for `base_url`, the full chat completions endpoint
    /// (defaults to [`API_URL`] through the config).
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, GroqError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            api_key,
            client,
            base_url,
        })
    }
}

impl ChatSender for GroqClient {
    #[instrument(skip_all, fields(model = %req.model))]
    async fn send_chat(&self, req: &ChatRequest) -> Result<ChatResponse, GroqError> {
        if self.api_key.is_empty() {
            return Err(GroqError::MissingApiKey);
        }

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(req)
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "chat completion responded");

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return Err(GroqError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GroqError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<ChatResponse>().await?;
        Ok(body)
    }
}
