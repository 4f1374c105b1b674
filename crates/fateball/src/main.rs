//! Ask the magic ball a question from the command line.
//!
//! Reads the API key from the `DEEPSEEK_API_KEY` environment variable or a
//! `.env` file in the working directory.
//!
//! # Examples
//!
//! ```sh
//! # Ask the default question
//! fateball
//!
//! # Ask your own
//! fateball "Получу ли я повышение?"
//!
//! # Keep one session open and watch the tone change on repeats
//! fateball --interactive
//!
//! # Point at another OpenAI-compatible endpoint
//! fateball --api-url http://localhost:8080/v1/chat/completions --model local
//! ```

use clap::Parser;
use fateball::prelude::*;
use fateball::{API_KEY_ENV, DEFAULT_MODEL, DEEPSEEK_URL};
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_QUESTION: &str = "Стоит ли мне начинать этот проект?";
const FALLBACK_ANSWER: &str = "Ошибка магии";

/// Ask the magic ball a question.
#[derive(Parser)]
#[command(name = "fateball")]
struct Cli {
    /// Question to ask
    #[arg(default_value = DEFAULT_QUESTION)]
    question: String,

    /// Read questions line by line from stdin, keeping one session
    #[arg(long, short)]
    interactive: bool,

    /// Model to use
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Chat completions endpoint
    #[arg(long, default_value = DEEPSEEK_URL)]
    api_url: String,

    /// Log engine decisions (repeat -vv for request details)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "fateball=info",
        _ => "fateball=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_oracle(cli: &Cli) -> Result<Oracle, AnswerError> {
    let config = ClientConfig::default()
        .with_model(&cli.model)
        .with_api_url(&cli.api_url);
    let client = DeepSeekClient::from_env_with(config)?;
    Ok(Oracle::new(Arc::new(client)).with_event_handler(Arc::new(LoggingHandler)))
}

async fn ask_once(oracle: &Oracle, session: &mut SessionState, question: &str) {
    println!("❓ Вопрос: {}", question.trim());
    match oracle.ask(session, question).await {
        Ok(answer) => println!("✨ Ответ: {}", answer.text),
        Err(e) => {
            error!("answer failed: {e}");
            eprintln!("Error: {e}");
            println!("✨ Ответ: {FALLBACK_ANSWER}");
        }
    }
}

async fn run_interactive(oracle: &Oracle) -> io::Result<()> {
    let mut session = SessionState::new();
    let stdin = io::stdin();
    print!("> ");
    io::stdout().flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            ask_once(oracle, &mut session, &line).await;
            println!();
        }
        print!("> ");
        io::stdout().flush()?;
    }
    println!();
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let oracle = match build_oracle(&cli) {
        Ok(oracle) => oracle,
        Err(AnswerError::MissingCredential(var)) => {
            eprintln!("Error: {var} is not set.");
            eprintln!("Create a .env file with {API_KEY_ENV}=your_key or export the variable.");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    println!("🔮 Магический шар (модель {})", cli.model);

    if cli.interactive {
        if let Err(e) = run_interactive(&oracle).await {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    } else {
        let mut session = SessionState::new();
        ask_once(&oracle, &mut session, &cli.question).await;
    }
}
