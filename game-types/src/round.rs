use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{PersonId, RevealPerson, RoundId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RoundStatus {
    Scheduled, // Before 12:00 local time
    Open,      // 12:00 - 17:00
    Closed,    // After 17:00, person revealed
}

impl RoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundStatus::Scheduled => "scheduled",
            RoundStatus::Open => "open",
            RoundStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "scheduled" => Some(RoundStatus::Scheduled),
            "open" => Some(RoundStatus::Open),
            "closed" => Some(RoundStatus::Closed),
            _ => None,
        }
    }
}

/// Public view of a round. Timestamps are unix milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundInfo {
    pub id: RoundId,
    pub status: RoundStatus,
    pub opens_at: i64,
    pub closes_at: i64,
    pub countdown_ms: i64,
    pub max_questions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundDebugInfo {
    pub force_round_open: bool,
    pub random_round_per_session: bool,
    pub current_person_id: Option<PersonId>,
    pub current_person_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CurrentRoundResponse {
    pub round: RoundInfo,
    pub debug: RoundDebugInfo,
    pub reveal_person: Option<RevealPerson>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DebugRoundPerson {
    pub round_id: RoundId,
    pub person_id: Option<PersonId>,
    pub person_name: Option<String>,
}
