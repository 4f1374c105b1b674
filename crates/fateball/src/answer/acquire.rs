//! Backend calls with bounded duplicate avoidance.
//!
//! [`acquire`] sends the composed instructions, the trailing session history
//! and the question to an [`AnswerBackend`]. When the question repeats the
//! previous one and the backend hands back the same answer as last time, the
//! call is retried at a higher temperature, up to
//! [`AcquireConfig::max_attempts`] calls in total. If every attempt still
//! duplicates, the last candidate is returned anyway.
//!
//! Backend failures are never retried here: the first error aborts the
//! request.

use super::composer::{MAX_ANSWER_WORDS, PromptSpec};
use super::events::{AnswerEvent, EventHandler};
use super::tracker::Turn;
use crate::Message;
use crate::error::BackendError;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`AnswerBackend::complete`].
pub type BackendFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, BackendError>> + Send + 'a>>;

/// One call to the answer backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A short-text generator reachable through a single call.
///
/// Implementations return the generated text (already trimmed) or a
/// [`BackendError`]. [`DeepSeekClient`](crate::DeepSeekClient) is the
/// production implementation.
pub trait AnswerBackend: Send + Sync {
    fn complete<'a>(&'a self, request: &'a BackendRequest) -> BackendFuture<'a>;
}

/// Tuning for the acquisition loop.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquireConfig {
    /// Maximum backend calls per request. Default: `3`.
    pub max_attempts: u32,
    /// Temperature of the first attempt. Default: `0.9`.
    pub base_temperature: f32,
    /// Temperature increase per retry. Default: `0.2`.
    pub temperature_step: f32,
    /// Temperature ceiling. Default: `1.5`.
    pub max_temperature: f32,
    /// Output length cap per call. Default: `10`.
    pub max_tokens: u32,
    /// How many trailing history turns are sent as context. Default: `10`.
    pub history_window: usize,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_temperature: 0.9,
            temperature_step: 0.2,
            max_temperature: 1.5,
            max_tokens: 10,
            history_window: 10,
        }
    }
}

impl AcquireConfig {
    /// Temperature for the attempt after one at `current`.
    pub fn next_temperature(&self, current: f32) -> f32 {
        (current + self.temperature_step).min(self.max_temperature)
    }
}

/// Compare answers ignoring case and whitespace layout.
pub fn answers_match(a: &str, b: &str) -> bool {
    fn squash(s: &str) -> String {
        s.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
    squash(a) == squash(b)
}

/// Cut an answer down to its first `max_words` words.
///
/// The prompt asks for at most [`MAX_ANSWER_WORDS`] words but the backend
/// does not always comply; longer replies are clipped rather than rejected.
pub fn clamp_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Outbound message sequence: system instructions, the last
/// `history_window` turns, then the question.
pub fn build_messages(
    prompt: &PromptSpec,
    history: &[Turn],
    question: &str,
    history_window: usize,
) -> Vec<Message> {
    let start = history.len().saturating_sub(history_window);
    let mut messages = Vec::with_capacity(history.len() - start + 2);
    messages.push(Message::system(&prompt.instructions));
    messages.extend(history[start..].iter().map(Turn::to_message));
    messages.push(Message::user(question.trim()));
    messages
}

/// Fetch an answer, steering away from `previous_answer` when it is set.
pub async fn acquire(
    backend: &dyn AnswerBackend,
    config: &AcquireConfig,
    prompt: &PromptSpec,
    history: &[Turn],
    question: &str,
    previous_answer: Option<&str>,
    handler: &dyn EventHandler,
) -> Result<String, BackendError> {
    let max_attempts = config.max_attempts.max(1);
    let mut request = BackendRequest {
        messages: build_messages(prompt, history, question, config.history_window),
        max_tokens: config.max_tokens,
        temperature: config.base_temperature,
    };
    let mut attempt = 0;

    loop {
        attempt += 1;
        handler.on_event(&AnswerEvent::AttemptStarted {
            attempt,
            max_attempts,
            temperature: request.temperature,
        });

        let candidate = clamp_words(&backend.complete(&request).await?, MAX_ANSWER_WORDS);

        let duplicate = previous_answer.is_some_and(|prev| answers_match(prev, &candidate));
        if !duplicate {
            handler.on_event(&AnswerEvent::Answered {
                attempts: attempt,
                answer: &candidate,
            });
            return Ok(candidate);
        }
        if attempt >= max_attempts {
            handler.on_event(&AnswerEvent::DuplicateTolerated {
                attempts: attempt,
                answer: &candidate,
            });
            return Ok(candidate);
        }

        handler.on_event(&AnswerEvent::DuplicateRejected {
            attempt,
            answer: &candidate,
        });
        request.temperature = config.next_temperature(request.temperature);
    }
}
