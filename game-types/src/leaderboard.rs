use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{RoundId, SessionId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub session_id: SessionId,
    pub username: Option<String>,
    pub questions_used: u32,
    pub time_from_start_ms: i64,
    pub time_from_open_ms: i64,
    pub solved_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LeaderboardResponse {
    pub round_id: RoundId,
    pub leaderboard: Vec<LeaderboardEntry>,
}
