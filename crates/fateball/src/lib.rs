//! Magic-ball answer engine with repetition-aware tone escalation.
//!
//! `fateball` answers free-text questions with a short, deliberately vague
//! phrase produced by a chat-completions backend (DeepSeek by default). It
//! remembers what each session asked: asking the same question again does
//! not get the same answer twice in a row, and the tone drifts from neutral
//! through encouragement or refusal to open exasperation the more often a
//! question is repeated.
//!
//! # Getting started
//!
//! ```ignore
//! use fateball::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AnswerError> {
//!     let client = DeepSeekClient::from_env()?;
//!     let oracle = Oracle::new(Arc::new(client));
//!
//!     let mut session = SessionState::new();
//!     let answer = oracle.ask(&mut session, "Стоит ли мне начинать проект?").await?;
//!     println!("{} (tier {})", answer.text, answer.tier.number());
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **The entry point:** [`Oracle`](answer::Oracle). Use
//!   [`get_answer`](answer::Oracle::get_answer) for a read-only call,
//!   [`ask`](answer::Oracle::ask) to also update a
//!   [`SessionState`](answer::SessionState), or
//!   [`ask_in`](answer::Oracle::ask_in) to go through a
//!   [`SessionStore`](answer::SessionStore).
//! - **Tone escalation:** [`answer::composer`] holds the tier table and the
//!   phrase lists of every [`Tone`](answer::Tone).
//! - **Duplicate avoidance:** [`answer::acquire`] and its
//!   [`AcquireConfig`](answer::AcquireConfig).
//! - **Plugging in a different backend:** implement
//!   [`AnswerBackend`](answer::AnswerBackend).
//! - **Observing decisions:** implement
//!   [`EventHandler`](answer::EventHandler), or use
//!   [`LoggingHandler`](answer::LoggingHandler) for `tracing` output.

pub mod answer;
pub mod error;
pub mod prelude;

use answer::{AnswerBackend, BackendFuture, BackendRequest};
use error::{AnswerError, BackendError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// ── Constants ──────────────────────────────────────────────────────

pub const DEEPSEEK_URL: &str = "https://api.deepseek.com/chat/completions";

/// Default model for answer generation.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Environment variable holding the backend credential.
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// Per-call timeout for backend requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body (OpenAI-compatible).
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "is_zero_f32")]
    pub temperature: f32,
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}
fn is_zero_f32(v: &f32) -> bool {
    *v == 0.0
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Turn an HTTP status and body into the trimmed answer text.
pub fn parse_completion(status: u16, body: &str) -> Result<String, BackendError> {
    if !(200..300).contains(&status) {
        return Err(BackendError::Status {
            status,
            body: body.to_string(),
        });
    }

    let parsed: RawChatResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))?;

    if let Some(err) = parsed.error {
        return Err(BackendError::Api(err.message));
    }

    if let Some(ref usage) = parsed.usage {
        debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens.unwrap_or(0),
            usage.completion_tokens.unwrap_or(0),
            usage.total_tokens.unwrap_or(0),
        );
    }

    parsed
        .choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(BackendError::EmptyAnswer)
}

// ── Client ─────────────────────────────────────────────────────────

/// Endpoint and model settings for [`DeepSeekClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Chat completions URL. Default: [`DEEPSEEK_URL`].
    pub api_url: String,
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// Per-request timeout. Default: [`REQUEST_TIMEOUT`].
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEEPSEEK_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Async HTTP client for an OpenAI-compatible chat completions API.
pub struct DeepSeekClient {
    client: reqwest::Client,
    api_key: String,
    config: ClientConfig,
}

impl DeepSeekClient {
    /// Create a client with the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Result<Self, AnswerError> {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Create a client with custom settings.
    ///
    /// Fails with [`AnswerError::MissingCredential`] when the key is blank.
    pub fn with_config(
        api_key: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self, AnswerError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AnswerError::MissingCredential(API_KEY_ENV.to_string()));
        }
        let client = reqwest::Client::builder()
            .user_agent("fateball/0.1")
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Create a client from the [`API_KEY_ENV`] environment variable.
    pub fn from_env() -> Result<Self, AnswerError> {
        Self::from_env_with(ClientConfig::default())
    }

    pub fn from_env_with(config: ClientConfig) -> Result<Self, AnswerError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| AnswerError::MissingCredential(API_KEY_ENV.to_string()))?;
        Self::with_config(api_key, config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a chat completion request and return the trimmed answer text.
    pub async fn chat(&self, body: &ChatRequest) -> Result<String, BackendError> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={}, temp={}",
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let text = resp.text().await.map_err(transport_error)?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        parse_completion(status.as_u16(), &text)
    }
}

fn transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Request(e.to_string())
    }
}

impl AnswerBackend for DeepSeekClient {
    fn complete<'a>(&'a self, request: &'a BackendRequest) -> BackendFuture<'a> {
        Box::pin(async move {
            let body = ChatRequest {
                model: self.config.model.clone(),
                messages: request.messages.clone(),
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            };
            self.chat(&body).await
        })
    }
}
