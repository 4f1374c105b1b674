//! Process-wide map from session id to [`SessionState`].
//!
//! Sessions are created on first use and live until the store is dropped;
//! nothing is evicted. Each session sits behind its own async mutex, so a
//! caller holding a [`SessionHandle`] across the backend call serializes
//! questions from that session while other sessions proceed independently.
//! The outer map lock is only held for lookups, never across an await.

use super::tracker::SessionState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shared, lockable handle to one session's state.
pub type SessionHandle = Arc<tokio::sync::Mutex<SessionState>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for `session_id`, creating an empty session if needed.
    pub fn session(&self, session_id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(SessionState::new())))
            .clone()
    }

    /// Handle for `session_id` if that session has asked anything yet.
    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.get(session_id).cloned()
    }

    /// Copy of a session's current state.
    ///
    /// Waits for the session lock, so it returns only after any in-flight
    /// question from that session has been answered.
    pub async fn snapshot(&self, session_id: &str) -> Option<SessionState> {
        let handle = self.get(session_id)?;
        let state = handle.lock().await;
        Some(state.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
