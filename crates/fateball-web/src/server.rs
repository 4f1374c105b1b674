//! Axum server setup and router construction.

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::api::{self, AppState};

/// Build the full axum router with permissive CORS.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ask", post(api::post_ask))
        .route("/api/sessions/{id}", get(api::get_session))
        .route("/api/health", get(api::health))
        .with_state(state)
        .layer(cors)
}

/// Bind `bind_addr`, serve `router` on a background task, and return the
/// bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;
    info!("fateball-web listening on {addr}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("server stopped: {e}");
        }
    });

    Ok(addr)
}
