//! Per-session repetition tracking and rolling turn history.
//!
//! A [`SessionState`] remembers the last question and answer, how many times
//! each normalized question has been asked, and a bounded history of turns
//! that is replayed to the backend as context.

use super::normalize;
use super::sentiment::{Sentiment, classify};
use crate::Message;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Maximum number of turns kept per session (10 question/answer pairs).
pub const MAX_HISTORY_LENGTH: usize = 20;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One exchanged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }

    /// Convert into a wire message for the backend.
    pub fn to_message(&self) -> Message {
        match self.role {
            TurnRole::User => Message::user(&self.content),
            TurnRole::Assistant => Message::assistant(&self.content),
        }
    }
}

/// Conversation state of a single session.
///
/// `last_answer` is set exactly when `last_question` is, and when both are
/// set they are the final two entries of `history`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    history: Vec<Turn>,
    last_question: Option<String>,
    last_answer: Option<String>,
    repeat_counts: HashMap<String, u32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            history: Vec::new(),
            last_question: None,
            last_answer: None,
            repeat_counts: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Normalized text of the most recent question.
    pub fn last_question(&self) -> Option<&str> {
        self.last_question.as_deref()
    }

    pub fn last_answer(&self) -> Option<&str> {
        self.last_answer.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// How many times `question` has been asked so far, without counting a
    /// new asking.
    pub fn repeat_count(&self, question: &str) -> u32 {
        self.repeat_counts
            .get(&normalize(question))
            .copied()
            .unwrap_or(0)
    }

    /// Whether `question` is the same normalized text as the last question.
    pub fn is_same_as_last(&self, question: &str) -> bool {
        is_same_question(self.last_question(), question)
    }

    /// Count one more asking of `question` and return the new total.
    ///
    /// This is a lifetime counter per normalized question: asking something
    /// else in between does not reset it.
    pub fn bump_repeat_count(&mut self, question: &str) -> u32 {
        let count = self.repeat_counts.entry(normalize(question)).or_insert(0);
        *count += 1;
        *count
    }

    /// Sentiment of the last answer, but only when `question` repeats the
    /// last question.
    pub fn prior_sentiment_for(&self, question: &str) -> Option<Sentiment> {
        self.previous_answer_for(question).map(classify)
    }

    /// The last answer, but only when `question` repeats the last question.
    pub fn previous_answer_for(&self, question: &str) -> Option<&str> {
        previous_answer(self.last_question(), self.last_answer(), question)
    }

    /// Append a question/answer pair and make it the latest exchange.
    pub fn record_turn(&mut self, question: &str, answer: &str) {
        self.history.push(Turn::user(question.trim()));
        self.history.push(Turn::assistant(answer));
        if self.history.len() > MAX_HISTORY_LENGTH {
            let excess = self.history.len() - MAX_HISTORY_LENGTH;
            self.history.drain(..excess);
        }
        self.last_question = Some(normalize(question));
        self.last_answer = Some(answer.to_string());
        self.updated_at = Utc::now();
    }

    /// Borrow the fields the answer engine needs for one request.
    pub fn context_for(&self, repeat_count: u32) -> SessionContext<'_> {
        SessionContext {
            history: &self.history,
            last_question: self.last_question(),
            last_answer: self.last_answer(),
            repeat_count,
        }
    }
}

/// Read-only view of a session handed to
/// [`Oracle::get_answer`](super::Oracle::get_answer).
#[derive(Debug, Clone, Copy)]
pub struct SessionContext<'a> {
    pub history: &'a [Turn],
    pub last_question: Option<&'a str>,
    pub last_answer: Option<&'a str>,
    /// Repeat count of the current question, including this asking.
    pub repeat_count: u32,
}

impl<'a> SessionContext<'a> {
    /// A context for a session that has never asked anything.
    pub fn fresh() -> Self {
        Self {
            history: &[],
            last_question: None,
            last_answer: None,
            repeat_count: 1,
        }
    }

    pub fn is_same_as_last(&self, question: &str) -> bool {
        is_same_question(self.last_question, question)
    }

    pub fn previous_answer_for(&self, question: &str) -> Option<&'a str> {
        previous_answer(self.last_question, self.last_answer, question)
    }

    pub fn prior_sentiment_for(&self, question: &str) -> Option<Sentiment> {
        self.previous_answer_for(question).map(classify)
    }
}

fn is_same_question(last_question: Option<&str>, question: &str) -> bool {
    last_question.is_some_and(|last| normalize(last) == normalize(question))
}

fn previous_answer<'a>(
    last_question: Option<&str>,
    last_answer: Option<&'a str>,
    question: &str,
) -> Option<&'a str> {
    if is_same_question(last_question, question) {
        last_answer
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_question_counts_up() {
        let mut state = SessionState::new();
        let counts: Vec<u32> = (0..5)
            .map(|_| state.bump_repeat_count("Стоит ли?"))
            .collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn counter_survives_intervening_questions() {
        let mut state = SessionState::new();
        assert_eq!(state.bump_repeat_count("A"), 1);
        assert_eq!(state.bump_repeat_count("B"), 1);
        assert_eq!(state.bump_repeat_count("A"), 2);
    }

    #[test]
    fn counting_uses_normalized_text() {
        let mut state = SessionState::new();
        state.bump_repeat_count("Стоит ли?");
        assert_eq!(state.bump_repeat_count("  стоит ЛИ?  "), 2);
        assert_eq!(state.repeat_count("СТОИТ ЛИ?"), 2);
        assert_eq!(state.repeat_count("другое"), 0);
    }

    #[test]
    fn same_as_last_compares_normalized() {
        let mut state = SessionState::new();
        assert!(!state.is_same_as_last("Стоит ли?"));
        state.record_turn("Стоит ли?", "да");
        assert!(state.is_same_as_last(" стоит ли? "));
        assert!(!state.is_same_as_last("Стоит ли мне?"));
    }

    #[test]
    fn prior_sentiment_only_for_repeats() {
        let mut state = SessionState::new();
        state.record_turn("Стоит ли?", "нет");
        assert_eq!(
            state.prior_sentiment_for("стоит ли?"),
            Some(Sentiment::Discouraging)
        );
        assert_eq!(state.prior_sentiment_for("Другое?"), None);

        state.record_turn("Стоит ли?", "дерзай");
        assert_eq!(
            state.prior_sentiment_for("Стоит ли?"),
            Some(Sentiment::NotDiscouraging)
        );
    }

    #[test]
    fn record_turn_keeps_last_pair_at_the_end() {
        let mut state = SessionState::new();
        state.record_turn("  Стоит ЛИ?  ", "возможно");

        assert_eq!(state.last_question(), Some("стоит ли?"));
        assert_eq!(state.last_answer(), Some("возможно"));
        let history = state.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Turn::user("Стоит ЛИ?"));
        assert_eq!(history[1], Turn::assistant("возможно"));
    }

    #[test]
    fn history_is_bounded_to_most_recent_turns() {
        let mut state = SessionState::new();
        for i in 0..25 {
            state.record_turn(&format!("q{i}"), &format!("a{i}"));
        }

        let history = state.history();
        assert_eq!(history.len(), MAX_HISTORY_LENGTH);
        // Pairs 15..25 survive, in order.
        assert_eq!(history[0], Turn::user("q15"));
        assert_eq!(history[1], Turn::assistant("a15"));
        assert_eq!(history[19], Turn::assistant("a24"));
        assert_eq!(state.last_question(), Some("q24"));
        assert_eq!(state.last_answer(), Some("a24"));
    }

    #[test]
    fn context_exposes_previous_answer_for_repeats() {
        let mut state = SessionState::new();
        state.record_turn("Стоит ли?", "нет шансов");
        let ctx = state.context_for(2);

        assert_eq!(ctx.repeat_count, 2);
        assert_eq!(ctx.history.len(), 2);
        assert!(ctx.is_same_as_last("стоит ли?"));
        assert_eq!(ctx.previous_answer_for("стоит ли?"), Some("нет шансов"));
        assert_eq!(ctx.previous_answer_for("Что-то ещё?"), None);
        assert_eq!(
            ctx.prior_sentiment_for("Стоит ли?"),
            Some(Sentiment::Discouraging)
        );
    }

    #[test]
    fn fresh_context_has_no_prior() {
        let ctx = SessionContext::fresh();
        assert_eq!(ctx.repeat_count, 1);
        assert!(ctx.previous_answer_for("anything").is_none());
        assert!(ctx.prior_sentiment_for("anything").is_none());
    }

    #[test]
    fn turns_convert_to_wire_messages() {
        let msg = Turn::assistant("да").to_message();
        assert_eq!(msg.role, crate::MessageRole::Assistant);
        assert_eq!(msg.content, "да");
    }
}
