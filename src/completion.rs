//! Completion client: sends a conversational prompt to a hosted language
//! model and returns a single text completion.
//!
//! The pipeline only ever needs one-shot, non-streaming completions, so the
//! seam is a single `complete` method. [`OllamaClient`] talks to a hosted
//! Ollama-compatible chat endpoint; tests substitute their own
//! [`CompletionClient`] implementations.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default completion request timeout. Section-length generations on large
/// models routinely take over a minute.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// A single message in a conversational prompt.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Convenience constructor for a user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Convenience constructor for a system-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Hosted language-model client consumed by every generation stage.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `messages` to `model` and return the completion text.
    ///
    /// Transport and auth failures surface as errors; the pipeline does not
    /// retry here.
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// Client for a hosted Ollama-compatible `/api/chat` endpoint.
pub struct OllamaClient {
    http: reqwest::Client,
    host: String,
    api_key: Option<String>,
}

impl OllamaClient {
    /// Create a client for the given host (e.g. `https://ollama.com`).
    pub fn new(host: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("dossier/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            http,
            host: host.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Set a bearer API key for hosted endpoints.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Build a client from `OLLAMA_HOST` (default `https://ollama.com`) and
    /// `OLLAMA_API_KEY`.
    pub fn from_env() -> Self {
        let host =
            std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "https://ollama.com".to_string());
        let mut client = Self::new(host);
        if let Ok(key) = std::env::var("OLLAMA_API_KEY") {
            client = client.with_api_key(key);
        }
        client
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String> {
        let request = ChatRequest {
            model,
            messages,
            stream: false,
        };

        let mut builder = self
            .http
            .post(format!("{}/api/chat", self.host))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        Ok(chat.message.content)
    }
}
