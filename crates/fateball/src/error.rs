//! Typed failures for the answer engine and its backend.
//!
//! [`BackendError`] covers everything that can go wrong talking to the
//! answer backend. [`AnswerError`] is what the caller-facing operations on
//! [`Oracle`](crate::answer::Oracle) return.

use thiserror::Error;

/// A failure reported by an [`AnswerBackend`](crate::answer::AnswerBackend).
///
/// None of these are retried by the acquisition loop. Retries are reserved
/// for duplicate answers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("request timed out")]
    Timeout,
    #[error("backend HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("backend error: {0}")]
    Api(String),
    #[error("empty answer from backend")]
    EmptyAnswer,
}

/// A failure of a caller-facing answer operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnswerError {
    /// The question was missing or blank after trimming.
    #[error("question must be a non-empty string")]
    InvalidInput,
    /// No backend credential was configured.
    #[error("{0} is not set")]
    MissingCredential(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl AnswerError {
    /// Whether the failure was caused by the caller's input rather than the
    /// backend or configuration.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AnswerError::InvalidInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_converts_into_answer_error() {
        let err: AnswerError = BackendError::Timeout.into();
        assert_eq!(err, AnswerError::Backend(BackendError::Timeout));
        assert_eq!(err.to_string(), "request timed out");
    }

    #[test]
    fn status_error_includes_code_and_body() {
        let err = BackendError::Status {
            status: 503,
            body: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "backend HTTP 503: overloaded");
    }

    #[test]
    fn invalid_input_is_flagged() {
        assert!(AnswerError::InvalidInput.is_invalid_input());
        assert!(!AnswerError::MissingCredential("DEEPSEEK_API_KEY".into()).is_invalid_input());
    }
}
