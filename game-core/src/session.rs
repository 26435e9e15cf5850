use chrono::{DateTime, Utc};
use game_types::{GameError, MAX_QUESTIONS, RoundId, RoundStatus, SessionId, SessionView};

use crate::round::Round;

/// One device's attempt at a round
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub round_id: RoundId,
    pub device_hash: String,
    pub started_at: DateTime<Utc>,
    pub question_count: u32,
    pub hint_used: bool,
    pub solved: bool,
    pub solved_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn remaining_questions(&self) -> u32 {
        MAX_QUESTIONS.saturating_sub(self.question_count)
    }

    /// A session started for another round may only be played when the
    /// caller allows it (force-open or per-session random rounds).
    fn ensure_round(&self, round: &Round, allow_mismatch: bool) -> Result<(), GameError> {
        if !allow_mismatch && self.round_id != round.id() {
            return Err(GameError::SessionRoundMismatch);
        }
        Ok(())
    }

    pub fn ensure_question_allowed(&self, round: &Round, allow_mismatch: bool) -> Result<(), GameError> {
        self.ensure_round(round, allow_mismatch)?;
        if !round.is_open() {
            return Err(GameError::RoundNotOpen);
        }
        if self.solved {
            return Err(GameError::AlreadySolved);
        }
        if self.question_count >= MAX_QUESTIONS {
            return Err(GameError::QuestionLimitReached);
        }
        Ok(())
    }

    pub fn ensure_hint_allowed(&self, round: &Round, allow_mismatch: bool) -> Result<(), GameError> {
        self.ensure_round(round, allow_mismatch)?;
        if !round.is_open() {
            return Err(GameError::RoundNotOpen);
        }
        if self.hint_used {
            return Err(GameError::HintAlreadyUsed);
        }
        Ok(())
    }

    /// Solved sessions may keep guessing after close, it never changes the result
    pub fn ensure_guess_allowed(&self, round: &Round, allow_mismatch: bool) -> Result<(), GameError> {
        self.ensure_round(round, allow_mismatch)?;
        if !round.is_open() && !self.solved {
            return Err(GameError::RoundNotOpen);
        }
        Ok(())
    }

    pub fn should_reveal(&self, round: &Round) -> bool {
        self.solved || round.status == RoundStatus::Closed
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id.clone(),
            round_id: self.round_id.clone(),
            started_at: self.started_at.timestamp_millis(),
            question_count: self.question_count,
            hint_used: self.hint_used,
            solved: self.solved,
            solved_at: self.solved_at.map(|t| t.timestamp_millis()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::{RoundCalculator, RoundOptions};
    use chrono::TimeZone;

    fn at_hour(hour: u32) -> Round {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, hour, 30, 0).unwrap();
        RoundCalculator::utc().current(now, RoundOptions::default())
    }

    fn session() -> Session {
        Session {
            id: "s-1".to_string(),
            round_id: "2024-05-01".to_string(),
            device_hash: "abc".to_string(),
            started_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 5, 0).unwrap(),
            question_count: 0,
            hint_used: false,
            solved: false,
            solved_at: None,
        }
    }

    #[test]
    fn test_question_guards_in_order() {
        let open = at_hour(13);
        let mut s = session();
        assert!(s.ensure_question_allowed(&open, false).is_ok());

        s.question_count = MAX_QUESTIONS;
        assert_eq!(
            s.ensure_question_allowed(&open, false),
            Err(GameError::QuestionLimitReached)
        );

        s.solved = true;
        assert_eq!(s.ensure_question_allowed(&open, false), Err(GameError::AlreadySolved));
        assert_eq!(s.ensure_question_allowed(&at_hour(18), false), Err(GameError::RoundNotOpen));

        s.round_id = "2024-04-30".to_string();
        assert_eq!(
            s.ensure_question_allowed(&open, false),
            Err(GameError::SessionRoundMismatch)
        );
    }

    #[test]
    fn test_mismatch_allowed_when_requested() {
        let mut s = session();
        s.round_id = "2031-01-01".to_string();
        assert!(s.ensure_question_allowed(&at_hour(13), true).is_ok());
        assert!(s.ensure_hint_allowed(&at_hour(13), true).is_ok());
    }

    #[test]
    fn test_hint_guards() {
        let mut s = session();
        assert!(s.ensure_hint_allowed(&at_hour(12), false).is_ok());
        assert_eq!(s.ensure_hint_allowed(&at_hour(9), false), Err(GameError::RoundNotOpen));
        s.hint_used = true;
        assert_eq!(s.ensure_hint_allowed(&at_hour(12), false), Err(GameError::HintAlreadyUsed));
    }

    #[test]
    fn test_guess_after_close_only_when_solved() {
        let closed = at_hour(17);
        let mut s = session();
        assert_eq!(s.ensure_guess_allowed(&closed, false), Err(GameError::RoundNotOpen));
        s.solved = true;
        assert!(s.ensure_guess_allowed(&closed, false).is_ok());
    }

    #[test]
    fn test_reveal_rules() {
        let mut s = session();
        assert!(!s.should_reveal(&at_hour(13)));
        assert!(s.should_reveal(&at_hour(20)));
        s.solved = true;
        assert!(s.should_reveal(&at_hour(13)));
    }

    #[test]
    fn test_view_and_remaining() {
        let mut s = session();
        s.question_count = 7;
        assert_eq!(s.remaining_questions(), 13);
        let view = s.view();
        assert_eq!(view.question_count, 7);
        assert_eq!(view.started_at, s.started_at.timestamp_millis());
        assert_eq!(view.solved_at, None);
    }
}
