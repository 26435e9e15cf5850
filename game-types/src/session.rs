use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{RevealPerson, RoundId, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AnswerLabel {
    Yes,
    No,
    Unknown,
    ProbablyYes,
    ProbablyNo,
}

impl AnswerLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerLabel::Yes => "yes",
            AnswerLabel::No => "no",
            AnswerLabel::Unknown => "unknown",
            AnswerLabel::ProbablyYes => "probably_yes",
            AnswerLabel::ProbablyNo => "probably_no",
        }
    }

    /// Lenient parse used for stored rows and model output.
    /// Icelandic "já"/"nei" are accepted, anything unrecognised is `Unknown`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "yes" | "já" | "ja" => AnswerLabel::Yes,
            "no" | "nei" => AnswerLabel::No,
            "probably_yes" => AnswerLabel::ProbablyYes,
            "probably_no" => AnswerLabel::ProbablyNo,
            _ => AnswerLabel::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Answer {
    pub label: AnswerLabel,
    pub text: String,
}

impl Answer {
    pub fn new(label: AnswerLabel, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionView {
    pub id: SessionId,
    pub round_id: RoundId,
    pub started_at: i64, // unix ms
    pub question_count: u32,
    pub hint_used: bool,
    pub solved: bool,
    pub solved_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionRecord {
    pub question: String,
    pub answer_label: AnswerLabel,
    pub answer_text: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionState {
    pub session: SessionView,
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionOutcome {
    pub answer_label: AnswerLabel,
    pub answer_text: String,
    pub question_count: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessOutcome {
    pub correct: bool,
    pub solved: bool,
    pub reveal: bool,
    pub reveal_person: Option<RevealPerson>,
    pub solved_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HintOutcome {
    pub hint: String,
    pub hint_used: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Intent {
    Question,
    Guess,
    Hint,
}

/// Result of the free-text endpoint, tagged by the intent it was routed to
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum InputOutcome {
    Question {
        answer_label: AnswerLabel,
        answer_text: String,
        question_count: u32,
        remaining: u32,
    },
    Guess {
        correct: bool,
        solved: bool,
        reveal_person: Option<RevealPerson>,
        answer_text: String,
    },
    Hint {
        hint: String,
        answer_text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UsernameResponse {
    pub username: Option<String>,
}
