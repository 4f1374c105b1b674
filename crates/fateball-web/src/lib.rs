//! HTTP chat front end for the `fateball` answer engine.
//!
//! `fateball-web` exposes the magic ball over a small axum REST API that
//! behaves like a chat bot: each client identifies itself with a session id,
//! sends plain messages or `/start`/`/help` commands, and gets back
//! Markdown-formatted replies. Sessions live in a shared
//! [`SessionStore`](fateball::answer::SessionStore) for the lifetime of the
//! server.
//!
//! # Quick start
//!
//! ```ignore
//! use fateball::prelude::*;
//! use fateball_web::{WebConfig, spawn_web};
//! use std::sync::Arc;
//!
//! let oracle = Arc::new(Oracle::new(Arc::new(DeepSeekClient::from_env()?)));
//! let addr = spawn_web(oracle, WebConfig::default()).await?;
//! println!("Listening on http://{addr}");
//! ```
//!
//! # Endpoints
//!
//! - `POST /api/ask` with `{"session_id": "...", "message": "..."}`
//! - `GET /api/sessions/{id}` for a JSON snapshot of one session
//! - `GET /api/health`

mod api;
mod server;

pub use api::{AppState, AskReply, AskRequest, HELP_TEXT, START_TEXT, format_reply};
pub use server::{build_router, start_server};

use std::net::SocketAddr;
use std::sync::Arc;

use fateball::answer::{Oracle, SessionStore};

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
        }
    }
}

/// Spawn the web server on a Tokio task with a fresh session store.
///
/// Returns the bound address. The server runs until the Tokio runtime shuts
/// down.
pub async fn spawn_web(oracle: Arc<Oracle>, config: WebConfig) -> std::io::Result<SocketAddr> {
    let state = AppState {
        oracle,
        store: Arc::new(SessionStore::new()),
    };
    start_server(build_router(state), config.bind_addr).await
}
