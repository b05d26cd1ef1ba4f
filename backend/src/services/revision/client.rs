//! HTTP client for the external text-generation service.
//!
//! The service is an OpenAI-compatible chat-completions API; the pipeline
//! only needs "prompt in, text out", so that is the whole trait surface.
//! Tests substitute scripted mock generators behind the same trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::SecretStore;

#[derive(Debug, thiserror::Error)]
pub enum TextGenError {
    #[error("API 키가 설정되지 않았습니다")]
    MissingApiKey,

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("요청 실패: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status code.
    #[error("텍스트 생성 서비스 오류 ({status}): {body}")]
    Api { status: u16, body: String },

    /// 2xx response whose body did not have the expected shape.
    #[error("응답 형식 오류: {0}")]
    Malformed(String),
}

impl TextGenError {
    /// Transport failures and throttling/server errors are worth a bounded
    /// retry with backoff; auth and client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TextGenError::Transport(_) => true,
            TextGenError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Opaque text-completion service used by the revision pipeline.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, TextGenError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Client for an OpenAI-compatible `POST /v1/chat/completions` endpoint.
pub struct OpenAiChatClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    secrets: Arc<dyn SecretStore>,
}

impl OpenAiChatClient {
    pub fn new(base_url: String, model: String, secrets: Arc<dyn SecretStore>) -> Self {
        OpenAiChatClient {
            client: reqwest::Client::new(),
            base_url,
            model,
            secrets,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, TextGenError> {
        let api_key = self.secrets.get().ok_or(TextGenError::MissingApiKey)?;
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TextGenError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TextGenError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| TextGenError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TextGenError::Malformed("응답에 choices가 없습니다".to_string()))
    }
}
