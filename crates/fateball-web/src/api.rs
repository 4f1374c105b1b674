//! REST API endpoint handlers.
//!
//! `POST /api/ask` behaves like a chat bot message handler: `/start` and
//! `/help` get fixed texts, other commands are ignored, and everything else
//! is answered by the [`Oracle`] within the caller's session.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fateball::answer::{Oracle, SessionStore};
use fateball::error::AnswerError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

pub const START_TEXT: &str = "🔮 *Привет! Я Магический Шар Судьбы*

Задай мне любой вопрос, и я отвечу кратко и загадочно!

*Примеры вопросов:*
• Стоит ли мне начать проект?
• Получу ли я повышение?
• Стоит ли доверять этому человеку?
• Ждать ли мне изменений в жизни?

*Просто напиши свой вопрос...*";

pub const HELP_TEXT: &str = "💫 *Как пользоваться магическим шаром:*

1. Задай вопрос о будущем, решениях или возможностях
2. Я отвечу одним-тремя словами
3. Интерпретируй ответ интуитивно!

*Примеры ответов:*
✅ да, возможно, дерзай, время покажет, верь в себя
❌ нет, маловероятно, не сейчас, осторожнее

*Задавай вопросы с верой в магию!* 🔮";

const EMPTY_QUESTION_TEXT: &str = "🤔 Шар молчит... Напиши свой вопрос словами";
const UNAVAILABLE_TEXT: &str = "⚠️ Магия временно недоступна... Попробуй позже";

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub oracle: Arc<Oracle>,
    pub store: Arc<SessionStore>,
}

/// Request body for POST /api/ask.
#[derive(Deserialize, Debug)]
pub struct AskRequest {
    pub session_id: String,
    pub message: String,
}

/// Response body for POST /api/ask.
///
/// `answer` and `repeat_count` are only present when a question was answered.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct AskReply {
    pub reply: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<u32>,
}

impl AskReply {
    fn text(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            answer: None,
            repeat_count: None,
        }
    }
}

/// Chat reply shown for an answered question.
pub fn format_reply(question: &str, answer: &str) -> String {
    format!(
        "🔮 *Твой вопрос:* {}\n\n✨ *Ответ судьбы:* {answer}",
        question.trim()
    )
}

#[derive(Debug, PartialEq, Eq)]
enum Incoming<'a> {
    /// Command name without the slash or any `@bot` suffix.
    Command(&'a str),
    Question(&'a str),
}

fn parse_message(message: &str) -> Incoming<'_> {
    match message.strip_prefix('/') {
        Some(rest) => {
            let name = rest
                .split(|c: char| c.is_whitespace() || c == '@')
                .next()
                .unwrap_or_default();
            Incoming::Command(name)
        }
        None => Incoming::Question(message),
    }
}

fn text_response(status: StatusCode, text: &str) -> Response {
    (status, Json(AskReply::text(text))).into_response()
}

/// POST /api/ask: Handle one chat message.
///
/// Returns 200 with an [`AskReply`], 204 for ignored commands, 400 for a
/// blank question, and 502 when the backend fails.
pub async fn post_ask(State(app): State<AppState>, Json(body): Json<AskRequest>) -> Response {
    let question = match parse_message(&body.message) {
        Incoming::Command("start") => return text_response(StatusCode::OK, START_TEXT),
        Incoming::Command("help") => return text_response(StatusCode::OK, HELP_TEXT),
        Incoming::Command(other) => {
            debug!(session = %body.session_id, "ignoring command /{other}");
            return StatusCode::NO_CONTENT.into_response();
        }
        Incoming::Question(question) => question,
    };

    match app.oracle.ask_in(&app.store, &body.session_id, question).await {
        Ok(answer) => {
            info!(
                session = %body.session_id,
                repeat_count = answer.repeat_count,
                tier = answer.tier.number(),
                "answered: {}",
                answer.text
            );
            let reply = format_reply(question, &answer.text);
            Json(AskReply {
                reply,
                answer: Some(answer.text),
                repeat_count: Some(answer.repeat_count),
            })
            .into_response()
        }
        Err(AnswerError::InvalidInput) => {
            text_response(StatusCode::BAD_REQUEST, EMPTY_QUESTION_TEXT)
        }
        Err(e) => {
            error!(session = %body.session_id, "answer failed: {e}");
            text_response(StatusCode::BAD_GATEWAY, UNAVAILABLE_TEXT)
        }
    }
}

/// GET /api/sessions/{id}: Session snapshot.
///
/// Returns 404 for sessions that have never asked anything. The snapshot
/// waits for the session's lock, so while a question from that session is
/// in flight this blocks until it finishes (at most `max_attempts` backend
/// calls, each bounded by the client timeout).
pub async fn get_session(State(app): State<AppState>, Path(id): Path<String>) -> Response {
    match app.store.snapshot(&id).await {
        Some(session) => Json(session).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /api/health: Liveness probe.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": app.store.len(),
    }))
}
