//! Integration tests for the fateball-web server.
//!
//! These tests start a real axum server on a random port, backed by a stub
//! answer backend, and exercise the REST endpoints.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use fateball::answer::{AnswerBackend, BackendFuture, BackendRequest, Oracle};
use fateball::error::BackendError;
use fateball_web::{AskReply, HELP_TEXT, START_TEXT, WebConfig, spawn_web};

/// Cycles through fixed short answers.
struct CyclingBackend {
    answers: Vec<&'static str>,
    calls: AtomicUsize,
}

impl AnswerBackend for CyclingBackend {
    fn complete<'a>(&'a self, _request: &'a BackendRequest) -> BackendFuture<'a> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self.answers[n % self.answers.len()].to_string();
        Box::pin(async move { Ok::<_, BackendError>(answer) })
    }
}

struct DownBackend;

impl AnswerBackend for DownBackend {
    fn complete<'a>(&'a self, _request: &'a BackendRequest) -> BackendFuture<'a> {
        Box::pin(async { Err::<String, _>(BackendError::Timeout) })
    }
}

/// Answers only after a delay, so a request stays in flight for a while.
struct SlowBackend;

impl AnswerBackend for SlowBackend {
    fn complete<'a>(&'a self, _request: &'a BackendRequest) -> BackendFuture<'a> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok::<_, BackendError>("время покажет".to_string())
        })
    }
}

/// Helper: spawn a test server on port 0 (random available port).
async fn spawn_test_server(backend: Arc<dyn AnswerBackend>) -> String {
    let oracle = Arc::new(Oracle::new(backend));
    let config = WebConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(),
    };
    let addr = spawn_web(oracle, config).await.unwrap();
    format!("http://{addr}")
}

fn cycling() -> Arc<CyclingBackend> {
    Arc::new(CyclingBackend {
        answers: vec!["да", "нет", "возможно"],
        calls: AtomicUsize::new(0),
    })
}

async fn ask(base: &str, session: &str, message: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}/api/ask"))
        .json(&serde_json::json!({"session_id": session, "message": message}))
        .send()
        .await
        .unwrap()
}

// ── Commands ─────────────────────────────────────────────────────────

#[tokio::test]
async fn start_and_help_return_fixed_texts() {
    let backend = cycling();
    let base = spawn_test_server(backend.clone()).await;

    let resp = ask(&base, "u1", "/start").await;
    assert_eq!(resp.status(), 200);
    let reply: AskReply = resp.json().await.unwrap();
    assert_eq!(reply.reply, START_TEXT);
    assert!(reply.answer.is_none());

    let reply: AskReply = ask(&base, "u1", "/help").await.json().await.unwrap();
    assert_eq!(reply.reply, HELP_TEXT);

    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_commands_are_ignored() {
    let backend = cycling();
    let base = spawn_test_server(backend.clone()).await;

    let resp = ask(&base, "u1", "/settings").await;
    assert_eq!(resp.status(), 204);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);

    let resp = reqwest::get(format!("{base}/api/sessions/u1")).await.unwrap();
    assert_eq!(resp.status(), 404);
}

// ── Questions ────────────────────────────────────────────────────────

#[tokio::test]
async fn question_gets_formatted_reply() {
    let base = spawn_test_server(cycling()).await;

    let resp = ask(&base, "u1", "Стоит ли мне начать проект?").await;
    assert_eq!(resp.status(), 200);
    let reply: AskReply = resp.json().await.unwrap();
    assert_eq!(reply.answer.as_deref(), Some("да"));
    assert_eq!(reply.repeat_count, Some(1));
    assert_eq!(
        reply.reply,
        "🔮 *Твой вопрос:* Стоит ли мне начать проект?\n\n✨ *Ответ судьбы:* да"
    );
}

#[tokio::test]
async fn repeat_count_is_tracked_per_session() {
    let base = spawn_test_server(cycling()).await;

    ask(&base, "alice", "Стоит ли?").await;
    let again: AskReply = ask(&base, "alice", "  стоит ЛИ? ")
        .await
        .json()
        .await
        .unwrap();
    let bob: AskReply = ask(&base, "bob", "Стоит ли?").await.json().await.unwrap();

    assert_eq!(again.repeat_count, Some(2));
    assert_eq!(bob.repeat_count, Some(1));
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let backend = cycling();
    let base = spawn_test_server(backend.clone()).await;

    let resp = ask(&base, "u1", "   ").await;
    assert_eq!(resp.status(), 400);
    let reply: AskReply = resp.json().await.unwrap();
    assert!(!reply.reply.is_empty());
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn backend_failure_returns_apology() {
    let base = spawn_test_server(Arc::new(DownBackend)).await;

    let resp = ask(&base, "u1", "Стоит ли?").await;
    assert_eq!(resp.status(), 502);
    let reply: AskReply = resp.json().await.unwrap();
    assert_eq!(reply.reply, "⚠️ Магия временно недоступна... Попробуй позже");
    assert!(reply.answer.is_none());
}

// ── Sessions and health ──────────────────────────────────────────────

#[tokio::test]
async fn session_snapshot_reflects_history() {
    let base = spawn_test_server(cycling()).await;
    ask(&base, "u1", "Стоит ли?").await;
    ask(&base, "u1", "Стоит ли?").await;

    let resp = reqwest::get(format!("{base}/api/sessions/u1")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["history"].as_array().unwrap().len(), 4);
    assert_eq!(json["last_question"], "стоит ли?");
    assert_eq!(json["repeat_counts"]["стоит ли?"], 2);
}

#[tokio::test]
async fn health_reports_ok() {
    let base = spawn_test_server(cycling()).await;
    ask(&base, "u1", "Стоит ли?").await;

    let resp = reqwest::get(format!("{base}/api/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sessions"], 1);
}

#[tokio::test]
async fn snapshot_waits_for_in_flight_question() {
    let base = spawn_test_server(Arc::new(SlowBackend)).await;

    let pending = tokio::spawn({
        let base = base.clone();
        async move { ask(&base, "u1", "Стоит ли?").await.status() }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The snapshot is taken after the in-flight answer is recorded.
    let resp = reqwest::get(format!("{base}/api/sessions/u1")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["last_answer"], "время покажет");
    assert_eq!(json["history"].as_array().unwrap().len(), 2);

    assert_eq!(pending.await.unwrap(), 200);
}
