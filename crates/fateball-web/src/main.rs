//! Magic-ball chat server.
//!
//! # Usage
//!
//! ```bash
//! DEEPSEEK_API_KEY=sk-... cargo run -p fateball-web
//! DEEPSEEK_API_KEY=sk-... cargo run -p fateball-web -- --port 8080
//! ```
//!
//! Then talk to it with curl:
//!
//! ```bash
//! curl -s localhost:3001/api/ask \
//!   -H 'content-type: application/json' \
//!   -d '{"session_id": "me", "message": "Стоит ли мне начинать проект?"}'
//! ```

use std::sync::Arc;

use clap::Parser;
use fateball::prelude::*;
use fateball::{DEEPSEEK_URL, DEFAULT_MODEL};
use fateball_web::{WebConfig, spawn_web};
use tracing_subscriber::EnvFilter;

/// Magic-ball chat server.
#[derive(Parser)]
#[command(about = "Chat server for the repetition-aware magic ball")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Model to use.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Chat completions endpoint.
    #[arg(long, default_value = DEEPSEEK_URL)]
    api_url: String,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    dotenv::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let config = ClientConfig::default()
        .with_model(&args.model)
        .with_api_url(&args.api_url);
    let client = DeepSeekClient::from_env_with(config).map_err(|e| match e {
        AnswerError::MissingCredential(var) => {
            format!("{var} is not set. Put it in .env or export it.")
        }
        other => other.to_string(),
    })?;
    let oracle =
        Arc::new(Oracle::new(Arc::new(client)).with_event_handler(Arc::new(LoggingHandler)));

    let web_config = WebConfig {
        bind_addr: ([127, 0, 0, 1], args.port).into(),
    };
    let addr = spawn_web(oracle, web_config)
        .await
        .map_err(|e| format!("failed to bind port {}: {e}", args.port))?;
    println!("🚀 Магический шар слушает на http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to wait for Ctrl-C: {e}"))?;
    println!("Остановлен.");
    Ok(())
}
