// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Groq chat-completions provider
//!
//! Groq exposes an OpenAI-compatible API, so this client also works against
//! any `/chat/completions` endpoint speaking the same dialect.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::provider::HintGenerator;
use super::types::{CompletionRequest, HintError};

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the Groq chat-completions API
pub struct GroqClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout_ms: u64,
}

impl GroqClient {
    /// Create a new Groq client
    ///
    /// # Arguments
    /// * `endpoint` - API base URL, e.g. `https://api.groq.com/openai/v1`
    /// * `api_key` - Groq API key
    /// * `model` - Model id
    /// * `timeout_ms` - Transport-level request timeout
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout_ms: u64) -> Result<Self, HintError> {
        if api_key.is_empty() {
            return Err(HintError::NoApiKey {
                provider: "groq".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| HintError::ApiError {
                status: 0,
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!("Groq client configured: endpoint={}, model={}", endpoint, model);

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout_ms,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl HintGenerator for GroqClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, HintError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HintError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    HintError::ApiError {
                        status: 0,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(HintError::NoApiKey {
                provider: "groq".to_string(),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HintError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| HintError::Malformed(format!("JSON parse error: {}", e)))?;

        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| HintError::Malformed("no choices in response".to_string()))?;

        debug!("Groq returned {} bytes", content.len());
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "groq"
    }
}
