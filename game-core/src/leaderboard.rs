use chrono::{DateTime, Utc};
use game_types::{LeaderboardEntry, SessionId};

/// A solved session as read from storage, before ranking.
#[derive(Debug, Clone)]
pub struct SolvedSession {
    pub session_id: SessionId,
    pub username: Option<String>,
    pub question_count: u32,
    pub started_at: DateTime<Utc>,
    pub solved_at: DateTime<Utc>,
}

impl SolvedSession {
    fn time_from_start_ms(&self) -> i64 {
        (self.solved_at - self.started_at).num_milliseconds().max(0)
    }

    fn time_from_open_ms(&self, opens_at: DateTime<Utc>) -> i64 {
        (self.solved_at - opens_at).num_milliseconds().max(0)
    }
}

/// Orders solvers by fewest questions, then elapsed time, and assigns dense
/// ranks. Rows with identical scores share a rank; session id only breaks the
/// display order.
pub fn rank_solved(mut rows: Vec<SolvedSession>, opens_at: DateTime<Utc>) -> Vec<LeaderboardEntry> {
    rows.sort_by(|a, b| {
        a.question_count
            .cmp(&b.question_count)
            .then_with(|| a.time_from_start_ms().cmp(&b.time_from_start_ms()))
            .then_with(|| a.time_from_open_ms(opens_at).cmp(&b.time_from_open_ms(opens_at)))
            .then_with(|| a.solved_at.cmp(&b.solved_at))
            .then_with(|| a.session_id.cmp(&b.session_id))
    });

    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(rows.len());
    let mut rank = 0;
    let mut previous: Option<(u32, i64, i64, i64)> = None;

    for row in rows {
        let key = (
            row.question_count,
            row.time_from_start_ms(),
            row.time_from_open_ms(opens_at),
            row.solved_at.timestamp_millis(),
        );
        if previous != Some(key) {
            rank += 1;
            previous = Some(key);
        }

        entries.push(LeaderboardEntry {
            rank,
            session_id: row.session_id,
            username: row.username,
            questions_used: key.0,
            time_from_start_ms: key.1,
            time_from_open_ms: key.2,
            solved_at: key.3,
        });
    }

    entries
}
