//! Lexicon-based sentiment label for short answer phrases.

use super::normalize;

/// Substrings that mark an answer as discouraging.
///
/// Matched against the lowercased, trimmed answer. `"нет"` alone already
/// covers `"нет шансов"` and `"точно нет"`; the longer entries are kept so the
/// list reads as the actual vocabulary it guards against.
pub const DISCOURAGING_PATTERNS: &[&str] = &[
    "нет",
    "нет шансов",
    "не стоит",
    "не сейчас",
    "не время",
    "не надо",
    "маловероятно",
    "вряд ли",
    "сомнительно",
    "подожди",
    "осторожн",
    "даже не думай",
    "забудь",
    "откажись",
];

/// Whether an answer leans negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Discouraging,
    NotDiscouraging,
}

impl Sentiment {
    pub fn is_discouraging(self) -> bool {
        self == Sentiment::Discouraging
    }
}

/// Classify an answer phrase.
///
/// Blank input carries no signal and is never discouraging.
pub fn classify(answer: &str) -> Sentiment {
    let normalized = normalize(answer);
    if normalized.is_empty() {
        return Sentiment::NotDiscouraging;
    }
    if DISCOURAGING_PATTERNS.iter().any(|p| normalized.contains(p)) {
        Sentiment::Discouraging
    } else {
        Sentiment::NotDiscouraging
    }
}
