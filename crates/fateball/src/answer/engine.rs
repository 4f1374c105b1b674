//! The caller-facing answer engine.

use super::acquire::{AcquireConfig, AnswerBackend, acquire};
use super::composer::{PromptSpec, Tier, Tone, compose};
use super::events::{AnswerEvent, EventHandler, NoopHandler};
use super::store::SessionStore;
use super::tracker::{SessionContext, SessionState};
use crate::error::AnswerError;
use serde::Serialize;
use std::sync::Arc;

/// A produced answer together with how it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    /// Lifetime count of this question in its session, including this asking.
    pub repeat_count: u32,
    pub tier: Tier,
    pub tone: Tone,
}

/// Repetition-aware answer engine.
///
/// Cheap to share behind an `Arc`; all per-user state lives in
/// [`SessionState`] values owned by the caller or a [`SessionStore`].
///
/// # Example
///
/// ```ignore
/// let client = DeepSeekClient::from_env()?;
/// let oracle = Oracle::new(Arc::new(client))
///     .with_event_handler(Arc::new(LoggingHandler));
///
/// let store = SessionStore::new();
/// let answer = oracle.ask_in(&store, "user-1", "Стоит ли?").await?;
/// println!("{}", answer.text);
/// ```
pub struct Oracle {
    backend: Arc<dyn AnswerBackend>,
    config: AcquireConfig,
    handler: Arc<dyn EventHandler>,
}

impl Oracle {
    pub fn new(backend: Arc<dyn AnswerBackend>) -> Self {
        Self {
            backend,
            config: AcquireConfig::default(),
            handler: Arc::new(NoopHandler),
        }
    }

    pub fn with_config(mut self, config: AcquireConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn config(&self) -> &AcquireConfig {
        &self.config
    }

    /// Answer `question` given a read-only view of its session.
    ///
    /// Does not touch session state; use [`ask`](Self::ask) to also record
    /// the exchange.
    pub async fn get_answer(
        &self,
        question: &str,
        context: &SessionContext<'_>,
    ) -> Result<String, AnswerError> {
        let (text, _) = self.answer_with(question, context).await?;
        Ok(text)
    }

    /// Answer `question` and update `session` with the exchange.
    ///
    /// The repeat count is bumped before the backend is called, so a failed
    /// request still counts as an asking.
    pub async fn ask(
        &self,
        session: &mut SessionState,
        question: &str,
    ) -> Result<Answer, AnswerError> {
        validate(question)?;
        let repeat_count = session.bump_repeat_count(question);
        let (text, prompt) = {
            let context = session.context_for(repeat_count);
            self.answer_with(question, &context).await?
        };
        session.record_turn(question, &text);

        Ok(Answer {
            text,
            repeat_count,
            tier: prompt.tier,
            tone: prompt.tone,
        })
    }

    /// Like [`ask`](Self::ask), looking the session up in `store`.
    ///
    /// The session stays locked for the whole request, so concurrent
    /// questions from one session are answered one after another.
    pub async fn ask_in(
        &self,
        store: &SessionStore,
        session_id: &str,
        question: &str,
    ) -> Result<Answer, AnswerError> {
        validate(question)?;
        let handle = store.session(session_id);
        let mut session = handle.lock().await;
        self.ask(&mut session, question).await
    }

    async fn answer_with(
        &self,
        question: &str,
        context: &SessionContext<'_>,
    ) -> Result<(String, PromptSpec), AnswerError> {
        validate(question)?;
        let prior = context.prior_sentiment_for(question);
        let prompt = compose(context.repeat_count, prior);
        self.handler.on_event(&AnswerEvent::PromptComposed {
            question,
            repeat_count: context.repeat_count,
            tier: prompt.tier,
            tone: prompt.tone,
        });

        let text = acquire(
            self.backend.as_ref(),
            &self.config,
            &prompt,
            context.history,
            question,
            context.previous_answer_for(question),
            self.handler.as_ref(),
        )
        .await?;
        Ok((text, prompt))
    }
}

fn validate(question: &str) -> Result<(), AnswerError> {
    if question.trim().is_empty() {
        Err(AnswerError::InvalidInput)
    } else {
        Ok(())
    }
}
