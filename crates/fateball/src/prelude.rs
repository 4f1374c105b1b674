//! Convenience re-exports for common `fateball` types.
//!
//! ```ignore
//! use fateball::prelude::*;
//! ```
//!
//! Pulls in the client, the [`Oracle`] and its session types, and the event
//! handlers. Prompt internals (phrase lists, message building) stay in their
//! modules.

// ── Backend ─────────────────────────────────────────────────────────
pub use crate::{ClientConfig, DeepSeekClient, Message, MessageRole};

// ── Answer engine ───────────────────────────────────────────────────
pub use crate::answer::{
    AcquireConfig, Answer, AnswerBackend, AnswerEvent, BackendFuture, BackendRequest,
    EventHandler, FnEventHandler, LoggingHandler, NoopHandler, Oracle, Sentiment,
    SessionContext, SessionState, SessionStore, Tier, Tone,
};

// ── Errors ──────────────────────────────────────────────────────────
pub use crate::error::{AnswerError, BackendError};
