//! Repetition-aware answer selection.
//!
//! - [`sentiment`]: discouraging / not-discouraging label for an answer.
//! - [`tracker`]: per-session repeat counts, last exchange, and bounded
//!   history.
//! - [`composer`]: maps repeat count and prior sentiment onto a [`Tone`]
//!   and builds the system prompt.
//! - [`acquire`]: backend calls with bounded duplicate avoidance.
//! - [`store`]: process-wide [`SessionStore`].
//! - [`engine`]: the [`Oracle`] entry point tying the above together.
//! - [`events`]: [`EventHandler`] hooks for observing the engine.

pub mod acquire;
pub mod composer;
pub mod engine;
pub mod events;
pub mod sentiment;
pub mod store;
pub mod tracker;

pub use acquire::{AcquireConfig, AnswerBackend, BackendFuture, BackendRequest};
pub use composer::{PromptSpec, Tier, Tone, compose};
pub use engine::{Answer, Oracle};
pub use events::{AnswerEvent, EventHandler, FnEventHandler, LoggingHandler, NoopHandler};
pub use sentiment::{Sentiment, classify};
pub use store::{SessionHandle, SessionStore};
pub use tracker::{SessionContext, SessionState, Turn, TurnRole};

/// Lowercase and trim; the key used for question comparison and counting.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize("  Стоит ЛИ?\n"), "стоит ли?");
        assert_eq!(normalize(""), "");
    }
}
