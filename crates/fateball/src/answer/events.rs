//! Observation hooks for the answer engine.
//!
//! The engine performs no logging of its own. Instead it reports what it
//! decided through [`AnswerEvent`] values, and the caller chooses what to do
//! with them.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests, library use without observability |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures (counters, test hooks) |

use super::composer::{Tier, Tone};
use tracing::{debug, info, warn};

/// Something the engine decided or observed while answering.
#[derive(Debug)]
pub enum AnswerEvent<'a> {
    /// The prompt for this request was chosen.
    PromptComposed {
        question: &'a str,
        repeat_count: u32,
        tier: Tier,
        tone: Tone,
    },
    /// A backend call is about to be made.
    AttemptStarted {
        attempt: u32,
        max_attempts: u32,
        temperature: f32,
    },
    /// The backend repeated the previous answer and another attempt follows.
    DuplicateRejected { attempt: u32, answer: &'a str },
    /// Attempts ran out while still duplicating; the answer is used anyway.
    DuplicateTolerated { attempts: u32, answer: &'a str },
    /// An answer was accepted.
    Answered { attempts: u32, answer: &'a str },
}

/// Receiver for [`AnswerEvent`]s.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &AnswerEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// Logs events through `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &AnswerEvent<'_>) {
        match event {
            AnswerEvent::PromptComposed {
                question,
                repeat_count,
                tier,
                tone,
            } => {
                debug!(
                    "Prompt composed: question={question:?}, repeat_count={repeat_count}, tier={}, tone={tone:?}",
                    tier.number()
                );
            }
            AnswerEvent::AttemptStarted {
                attempt,
                max_attempts,
                temperature,
            } => {
                debug!("Backend attempt {attempt}/{max_attempts} at temperature {temperature:.1}");
            }
            AnswerEvent::DuplicateRejected { attempt, answer } => {
                debug!("Attempt {attempt} repeated the previous answer {answer:?}, retrying");
            }
            AnswerEvent::DuplicateTolerated { attempts, answer } => {
                warn!("Still duplicating after {attempts} attempts, keeping {answer:?}");
            }
            AnswerEvent::Answered { attempts, answer } => {
                info!("Answered {answer:?} after {attempts} attempt(s)");
            }
        }
    }
}

/// An event handler backed by a closure.
pub struct FnEventHandler<F>(F)
where
    F: Fn(&AnswerEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&AnswerEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&AnswerEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &AnswerEvent<'_>) {
        (self.0)(event)
    }
}
