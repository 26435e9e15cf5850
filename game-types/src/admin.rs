use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{PersonId, RoundId, RoundStatus, SessionId};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PersonSummary {
    pub id: PersonId,
    pub display_name: String,
    pub reveal_text: String,
    pub image_url: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreatePersonRequest {
    pub display_name: String,
    pub reveal_text: String,
    pub image_url: String,
    pub hint: Option<String>,
    pub aliases_csv: Option<String>,
    pub yes_keywords_csv: Option<String>,
    pub no_keywords_csv: Option<String>,
    #[serde(default)]
    pub is_icelander: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreatedPerson {
    pub id: PersonId,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundAssignment {
    pub round_id: RoundId,
    pub person_id: PersonId,
    pub person_name: Option<String>,
    pub hint_text: Option<String>,
    pub status_override: Option<RoundStatus>,
    pub opens_at: i64,
    pub closes_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssignRoundRequest {
    pub person_id: PersonId,
    pub hint_text: Option<String>,
    pub status_override: Option<RoundStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SubmissionKind {
    Question,
    Guess,
}

/// A single question or guess as seen by a reviewer
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmissionEvent {
    pub kind: SubmissionKind,
    pub round_id: RoundId,
    pub session_id: SessionId,
    pub text: String,
    pub answer_label: Option<String>,
    pub answer_text: Option<String>,
    pub is_correct: Option<bool>,
    pub flagged: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmissionList {
    pub round_id: Option<RoundId>,
    pub events: Vec<SubmissionEvent>,
}
