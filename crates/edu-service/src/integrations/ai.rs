//! Chat completion client for the study assistant.

use std::sync::Arc;

use async_trait::async_trait;
use edu_common::AiConfig;
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub const SYSTEM_PROMPT: &str = "You are EduResources Assistant, a friendly study helper for \
university students. Answer questions about course material, explain concepts step by step, \
suggest study strategies and point students to papers, notes and syllabus documents when useful. \
Keep answers concise and accurate.";

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI assistant is not configured")]
    NotConfigured,

    #[error("AI request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AI endpoint returned status {0}")]
    Status(u16),

    #[error("AI endpoint returned no answer")]
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// `system`, `user` or `assistant`
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait AiClient: Send + Sync {
    /// Send the conversation and return the assistant's reply text
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, AiError>;
}

/// Used when no API key is configured
#[derive(Debug, Clone, Default)]
pub struct DisabledAiClient;

#[async_trait]
impl AiClient for DisabledAiClient {
    async fn complete(&self, _messages: &[PromptMessage]) -> Result<String, AiError> {
        Err(AiError::NotConfigured)
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: PromptMessage,
}

/// OpenAI-compatible `chat/completions` client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(client: reqwest::Client, url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl AiClient for OpenAiClient {
    #[instrument(skip(self, messages), fields(model = %self.model, turns = messages.len()))]
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, AiError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AiError::Status(response.status().as_u16()));
        }

        let body: CompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AiError::EmptyResponse)
    }
}

pub fn ai_client_from_config(config: &AiConfig, client: reqwest::Client) -> Arc<dyn AiClient> {
    match &config.api_key {
        Some(key) => Arc::new(OpenAiClient::new(
            client,
            config.api_url.clone(),
            key.clone(),
            config.model.clone(),
        )),
        None => Arc::new(DisabledAiClient),
    }
}
