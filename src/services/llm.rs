//! Chat completions client
//!
//! One OpenAI-compatible client serves every model call in the service:
//! recommendation generation, taste analysis, and the free-text metadata
//! provider. The base URL and model name come from configuration, so
//! OpenAI- and DeepSeek-style endpoints are interchangeable.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// Per-request timeout for model calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sampling temperature used for every call.
const TEMPERATURE: f32 = 0.7;

/// The model collaborator behind recommendation and analysis text.
///
/// Implementations receive a system instruction plus a user prompt built
/// exclusively from sanitized titles, and return the model's raw text.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> AppResult<String>;
}

#[derive(Clone)]
pub struct LlmClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            api_key,
            api_url,
            model,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait::async_trait]
impl ChatCompleter for LlmClient {
    async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> AppResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens,
        };

        let response = self
            .http_client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Chat API returned status {}: {}",
                status, body
            )));
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::ExternalApi("Chat API returned no choices".to_string()))?;

        Ok(content)
    }
}
