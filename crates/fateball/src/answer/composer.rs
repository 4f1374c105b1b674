//! Escalation tiers and the instruction set sent to the backend.
//!
//! The backend keeps no state of its own, so tone is steered entirely
//! through the system prompt: each [`Tone`] enumerates a closed list of
//! short phrases, and [`compose`] picks the tone from the repeat count and
//! the sentiment of the previous answer.
//!
//! | repeat count | prior discouraging | otherwise |
//! |--------------|--------------------|-----------|
//! | 1            | Neutral            | Neutral   |
//! | 2            | StrongNegative     | Energizing |
//! | 3            | Confront           | Doubt     |
//! | 4            | MaxConfront        | StrongNegative |
//! | 5+           | MaxConfront        | MaxConfront |

use super::sentiment::Sentiment;
use serde::Serialize;

/// Opening line shared by every tier.
pub const PREAMBLE: &str = "Ты - магический шар желаний.";

/// Output constraints restated in every tier.
pub const ANSWER_RULES: &[&str] = &[
    "Отвечай ТОЛЬКО одним словом или максимум тремя словами на русском.",
    "Выбирай ответ только из доступных вариантов.",
    "НИКАКИХ объяснений!",
];

/// Upper bound on answer length, in whitespace-separated words.
pub const MAX_ANSWER_WORDS: usize = 3;

const NEUTRAL: &[&str] = &[
    "да",
    "нет",
    "возможно",
    "шанс есть",
    "маловероятно",
    "время покажет",
    "дерзай",
    "подожди",
    "спроси позже",
    "абсолютно точно",
    "нет шансов",
    "верь в себя",
    "знаки хороши",
    "не сейчас",
    "рискни",
    "осторожнее",
    "да судьба",
    "не время",
];

const ENERGIZING: &[&str] = &[
    "дерзай",
    "действуй",
    "рискни",
    "вперёд",
    "сейчас или никогда",
    "верь в себя",
    "абсолютно точно",
    "да судьба",
];

const STRONG_NEGATIVE: &[&str] = &[
    "нет",
    "нет шансов",
    "точно нет",
    "даже не думай",
    "откажись",
    "забудь об этом",
    "осторожнее",
    "не время",
];

const DOUBT: &[&str] = &[
    "возможно",
    "может быть",
    "подожди",
    "не спеши",
    "время покажет",
    "сомнительно",
    "спроси позже",
    "маловероятно",
];

const CONFRONT: &[&str] = &[
    "решай сам",
    "ты знаешь ответ",
    "я уже ответил",
    "тебе виднее",
    "хватит сомневаться",
    "ответ тот же",
    "сколько можно",
];

const MAX_CONFRONT: &[&str] = &[
    "хватит спрашивать",
    "перестань спрашивать",
    "я всё сказал",
    "решай уже сам",
    "ответ не изменится",
    "сколько можно",
    "хватит",
];

/// A named mood with its own directive and closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Energizing,
    StrongNegative,
    Doubt,
    Confront,
    MaxConfront,
}

impl Tone {
    /// The allowed short answers for this tone.
    pub fn phrases(self) -> &'static [&'static str] {
        match self {
            Tone::Neutral => NEUTRAL,
            Tone::Energizing => ENERGIZING,
            Tone::StrongNegative => STRONG_NEGATIVE,
            Tone::Doubt => DOUBT,
            Tone::Confront => CONFRONT,
            Tone::MaxConfront => MAX_CONFRONT,
        }
    }

    /// How the backend should lean when using this tone.
    pub fn directive(self) -> &'static str {
        match self {
            Tone::Neutral => "Будь краток и загадочен. Отвечай без предвзятости.",
            Tone::Energizing => {
                "Тебя спрашивают повторно. Подтолкни к действию и вдохни уверенность."
            }
            Tone::StrongNegative => {
                "Тебя спрашивают повторно. Отвечай твёрдым отказом и предостережением."
            }
            Tone::Doubt => "Вопрос задают снова. Посей сомнение и предложи повременить.",
            Tone::Confront => {
                "Вопрос задают снова и снова. С лёгким раздражением дай понять, \
                 что решать пользователю самому."
            }
            Tone::MaxConfront => {
                "Пользователь упрямо повторяет один и тот же вопрос. \
                 Потребуй перестать спрашивать и решать самому."
            }
        }
    }

    /// Whether `answer` is one of this tone's phrases (case-insensitive).
    pub fn allows(self, answer: &str) -> bool {
        let answer = super::normalize(answer);
        self.phrases().iter().any(|p| *p == answer)
    }
}

/// Escalation level derived from how often a question was asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
}

impl Tier {
    /// Map a repeat count onto a tier. Counts of 0 and 1 are both the first
    /// asking; everything from 5 up saturates.
    pub fn from_repeat_count(count: u32) -> Self {
        match count {
            0 | 1 => Tier::First,
            2 => Tier::Second,
            3 => Tier::Third,
            4 => Tier::Fourth,
            _ => Tier::Fifth,
        }
    }

    pub fn number(self) -> u32 {
        match self {
            Tier::First => 1,
            Tier::Second => 2,
            Tier::Third => 3,
            Tier::Fourth => 4,
            Tier::Fifth => 5,
        }
    }

    /// Pick the tone for this tier. An absent prior counts as not
    /// discouraging.
    pub fn tone(self, prior: Option<Sentiment>) -> Tone {
        let discouraged = prior.is_some_and(Sentiment::is_discouraging);
        match (self, discouraged) {
            (Tier::First, _) => Tone::Neutral,
            (Tier::Second, true) => Tone::StrongNegative,
            (Tier::Second, false) => Tone::Energizing,
            (Tier::Third, true) => Tone::Confront,
            (Tier::Third, false) => Tone::Doubt,
            (Tier::Fourth, true) => Tone::MaxConfront,
            (Tier::Fourth, false) => Tone::StrongNegative,
            (Tier::Fifth, _) => Tone::MaxConfront,
        }
    }
}

/// A composed instruction set for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub tier: Tier,
    pub tone: Tone,
    /// Full system prompt.
    pub instructions: String,
    /// The allowed answers, comma-separated.
    pub allowed_vocabulary_hint: String,
}

impl PromptSpec {
    pub fn vocabulary(&self) -> &'static [&'static str] {
        self.tone.phrases()
    }
}

/// Build the prompt for a question asked `repeat_count` times, given the
/// sentiment of the previous answer to that same question.
pub fn compose(repeat_count: u32, prior: Option<Sentiment>) -> PromptSpec {
    let tier = Tier::from_repeat_count(repeat_count);
    let tone = tier.tone(prior);
    let hint = tone.phrases().join(", ");

    let rules = ANSWER_RULES
        .iter()
        .map(|r| format!("- {r}"))
        .collect::<Vec<_>>()
        .join("\n");
    let instructions = [
        format!("{PREAMBLE} {}", tone.directive()),
        format!("## Доступные варианты\n\n{hint}"),
        format!("## Правила\n\n{rules}"),
    ]
    .join("\n\n");

    PromptSpec {
        tier,
        tone,
        instructions,
        allowed_vocabulary_hint: hint,
    }
}
