use chrono::{DateTime, TimeZone, Utc};
use game_core::{PersonCatalog, Round, RoundCalculator, RoundKey, RoundOptions, Session};
use game_types::Person;

/// 2024-05-01 at the given UTC hour and minute
pub fn may_first(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
}

pub fn current_round(now: DateTime<Utc>) -> Round {
    RoundCalculator::utc().current(now, RoundOptions::default())
}

/// The person the default catalog assigns to a round id
pub fn assigned_person(round_id: &str) -> Person {
    PersonCatalog::default().assigned_for(round_id).clone()
}

/// Creates a fresh session for the round starting at `started_at`
pub fn create_test_session(round: &Round, started_at: DateTime<Utc>) -> Session {
    Session {
        id: format!("session-{}", started_at.timestamp()),
        round_id: round.id(),
        device_hash: game_core::hash_device_id("test-device"),
        started_at,
        question_count: 0,
        hint_used: false,
        solved: false,
        solved_at: None,
    }
}

pub fn round_key(id: &str) -> RoundKey {
    id.parse().expect("valid round id")
}
