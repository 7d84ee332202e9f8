//! Anthropic Messages API client
//!
//! One request per generation. Failures are reported once; there is no retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::CompletionBackend;
use crate::config::Config;
use crate::error::{FlashError, FlashResult};

const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response envelope; only the content blocks matter here
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Client for the Messages endpoint
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Create a client from config. Fails when no API key is configured.
    pub fn new(config: &Config) -> FlashResult<Self> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(FlashError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: config.api_url.clone(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for AnthropicClient {
    async fn complete(&self, prompt: &str) -> FlashResult<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            warn!("❌ API Error ({}): {}", status, body_text);
            // {"error": {"message": "...", "type": "..."}}
            let message = serde_json::from_str::<serde_json::Value>(&body_text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(body_text);
            return Err(FlashError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("🧠 API raw body: {}", body_text);
        extract_text(&body_text)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

/// Pull the first text block out of a response envelope
fn extract_text(body: &str) -> FlashResult<String> {
    let envelope: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| FlashError::Envelope(format!("{} - Body: {}", e, body)))?;

    envelope
        .content
        .into_iter()
        .find(|block| block.kind == "text" || block.kind.is_empty())
        .and_then(|block| block.text)
        .ok_or_else(|| FlashError::Envelope("response has no text content".to_string()))
}
