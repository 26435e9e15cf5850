use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{device_sessions, guess_events, prelude::*, question_events, usernames};
use game_core::{Session, SolvedSession};
use game_types::{
    Answer, AnswerLabel, MAX_QUESTIONS, QuestionRecord, SubmissionEvent, SubmissionKind,
};

pub struct SessionRepository {
    db: DatabaseConnection,
}

fn model_to_session(model: device_sessions::Model) -> Session {
    Session {
        id: model.id,
        round_id: model.round_id,
        device_hash: model.device_id_hash,
        started_at: model.started_at,
        question_count: model.question_count.max(0) as u32,
        hint_used: model.hint_used,
        solved: model.solved,
        solved_at: model.solved_at,
    }
}

async fn load_session<C: ConnectionTrait>(db: &C, session_id: &str) -> Result<Option<Session>> {
    let model = DeviceSessions::find_by_id(session_id.to_string()).one(db).await?;
    Ok(model.map(model_to_session))
}

impl SessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        load_session(&self.db, session_id).await
    }

    pub async fn find_for_device(&self, device_hash: &str, round_id: &str) -> Result<Option<Session>> {
        let model = DeviceSessions::find()
            .filter(device_sessions::Column::DeviceIdHash.eq(device_hash))
            .filter(device_sessions::Column::RoundId.eq(round_id))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_session))
    }

    /// Resume the device's session for the round or start one. Concurrent
    /// starts converge on the row that won the unique index.
    pub async fn find_or_create(&self, device_hash: &str, round_id: &str, now: DateTime<Utc>) -> Result<Session> {
        if let Some(existing) = self.find_for_device(device_hash, round_id).await? {
            return Ok(existing);
        }

        let model = device_sessions::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            device_id_hash: Set(device_hash.to_string()),
            round_id: Set(round_id.to_string()),
            started_at: Set(now),
            question_count: Set(0),
            hint_used: Set(false),
            solved: Set(false),
            solved_at: Set(None),
            solve_question_index: Set(None),
        };

        DeviceSessions::insert(model)
            .on_conflict(
                OnConflict::columns([
                    device_sessions::Column::DeviceIdHash,
                    device_sessions::Column::RoundId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.find_for_device(device_hash, round_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created session"))
    }

    /// Count the question and store its answer in one transaction.
    /// Returns the new question count, or `None` when the session was already
    /// at the limit or solved by the time the update ran.
    pub async fn record_question(
        &self,
        session: &Session,
        question: &str,
        answer: &Answer,
        latency_ms: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>> {
        let txn = self.db.begin().await?;

        let updated = DeviceSessions::update_many()
            .col_expr(
                device_sessions::Column::QuestionCount,
                Expr::col(device_sessions::Column::QuestionCount).add(1),
            )
            .filter(device_sessions::Column::Id.eq(session.id.as_str()))
            .filter(device_sessions::Column::QuestionCount.lt(MAX_QUESTIONS as i32))
            .filter(device_sessions::Column::Solved.eq(false))
            .exec(&txn)
            .await?;

        if updated.rows_affected == 0 {
            debug!("Question rejected for session {}, limit or solved", session.id);
            txn.rollback().await?;
            return Ok(None);
        }

        QuestionEvents::insert(question_events::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            round_id: Set(session.round_id.clone()),
            session_id: Set(session.id.clone()),
            question_text: Set(question.to_string()),
            answer_label: Set(answer.label.as_str().to_string()),
            answer_text: Set(answer.text.clone()),
            latency_ms: Set(latency_ms),
            created_at: Set(now),
        })
        .exec_without_returning(&txn)
        .await?;

        let count = load_session(&txn, &session.id)
            .await?
            .map(|s| s.question_count)
            .ok_or_else(|| anyhow::anyhow!("Session vanished while recording question"))?;

        txn.commit().await?;
        Ok(Some(count))
    }

    /// Flip `hint_used` once. `false` means it was already set.
    pub async fn mark_hint_used(&self, session_id: &str) -> Result<bool> {
        let updated = DeviceSessions::update_many()
            .col_expr(device_sessions::Column::HintUsed, Expr::value(true))
            .filter(device_sessions::Column::Id.eq(session_id))
            .filter(device_sessions::Column::HintUsed.eq(false))
            .exec(&self.db)
            .await?;
        Ok(updated.rows_affected > 0)
    }

    /// Store a guess and, when correct, mark the session solved. Solving is
    /// one-way: a second correct guess keeps the first `solved_at`.
    pub async fn record_guess(
        &self,
        session: &Session,
        guess: &str,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        let txn = self.db.begin().await?;

        if correct {
            DeviceSessions::update_many()
                .col_expr(device_sessions::Column::Solved, Expr::value(true))
                .col_expr(device_sessions::Column::SolvedAt, Expr::value(now))
                .col_expr(
                    device_sessions::Column::SolveQuestionIndex,
                    Expr::col(device_sessions::Column::QuestionCount).into(),
                )
                .filter(device_sessions::Column::Id.eq(session.id.as_str()))
                .filter(device_sessions::Column::Solved.eq(false))
                .exec(&txn)
                .await?;
        }

        GuessEvents::insert(guess_events::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            round_id: Set(session.round_id.clone()),
            session_id: Set(session.id.clone()),
            guess_text: Set(guess.to_string()),
            is_correct: Set(correct),
            created_at: Set(now),
        })
        .exec_without_returning(&txn)
        .await?;

        let updated = load_session(&txn, &session.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Session vanished while recording guess"))?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Questions of a session, oldest first
    pub async fn question_history(&self, session_id: &str) -> Result<Vec<QuestionRecord>> {
        let rows = QuestionEvents::find()
            .filter(question_events::Column::SessionId.eq(session_id))
            .order_by_asc(question_events::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| QuestionRecord {
                question: row.question_text,
                answer_label: AnswerLabel::parse_lenient(&row.answer_label),
                answer_text: row.answer_text,
                created_at: row.created_at.timestamp_millis(),
            })
            .collect())
    }

    /// Solved sessions of a round with the device's username attached
    pub async fn solved_for_round(&self, round_id: &str) -> Result<Vec<SolvedSession>> {
        let rows = DeviceSessions::find()
            .filter(device_sessions::Column::RoundId.eq(round_id))
            .filter(device_sessions::Column::Solved.eq(true))
            .filter(device_sessions::Column::SolvedAt.is_not_null())
            .all(&self.db)
            .await?;

        let hashes: Vec<String> = rows.iter().map(|row| row.device_id_hash.clone()).collect();
        let names: HashMap<String, String> = if hashes.is_empty() {
            HashMap::new()
        } else {
            Usernames::find()
                .filter(usernames::Column::DeviceIdHash.is_in(hashes))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|row| (row.device_id_hash, row.username))
                .collect()
        };

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let solved_at = row.solved_at?;
                Some(SolvedSession {
                    username: names.get(&row.device_id_hash).cloned(),
                    session_id: row.id,
                    question_count: row.question_count.max(0) as u32,
                    started_at: row.started_at,
                    solved_at,
                })
            })
            .collect())
    }

    /// Recent questions and guesses, newest first. Flagged means a question
    /// the resolver could not answer.
    pub async fn list_submissions(
        &self,
        round_id: Option<&str>,
        limit: u64,
        flagged_only: bool,
    ) -> Result<Vec<SubmissionEvent>> {
        let unknown = AnswerLabel::Unknown.as_str();

        let mut questions = QuestionEvents::find();
        if let Some(round_id) = round_id {
            questions = questions.filter(question_events::Column::RoundId.eq(round_id));
        }
        if flagged_only {
            questions = questions.filter(question_events::Column::AnswerLabel.eq(unknown));
        }
        let questions = questions
            .order_by_desc(question_events::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        let mut events: Vec<SubmissionEvent> = questions
            .into_iter()
            .map(|row| SubmissionEvent {
                kind: SubmissionKind::Question,
                flagged: row.answer_label == unknown,
                round_id: row.round_id,
                session_id: row.session_id,
                text: row.question_text,
                answer_label: Some(row.answer_label),
                answer_text: Some(row.answer_text),
                is_correct: None,
                created_at: row.created_at.timestamp_millis(),
            })
            .collect();

        if !flagged_only {
            let mut guesses = GuessEvents::find();
            if let Some(round_id) = round_id {
                guesses = guesses.filter(guess_events::Column::RoundId.eq(round_id));
            }
            let guesses = guesses
                .order_by_desc(guess_events::Column::CreatedAt)
                .limit(limit)
                .all(&self.db)
                .await?;

            events.extend(guesses.into_iter().map(|row| SubmissionEvent {
                kind: SubmissionKind::Guess,
                round_id: row.round_id,
                session_id: row.session_id,
                text: row.guess_text,
                answer_label: None,
                answer_text: None,
                is_correct: Some(row.is_correct),
                flagged: false,
                created_at: row.created_at.timestamp_millis(),
            }));
        }

        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events.truncate(limit as usize);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use chrono::{Duration, TimeZone};

    async fn setup_test_db() -> SessionRepository {
        let db = connect_to_memory_database().await.unwrap();
        SessionRepository::new(db)
    }

    fn t(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn yes() -> Answer {
        Answer::new(AnswerLabel::Yes, "Já.")
    }

    #[tokio::test]
    async fn test_find_or_create_resumes_existing() {
        let repo = setup_test_db().await;

        let first = repo.find_or_create("hash-a", "2024-05-01", t(0)).await.unwrap();
        let again = repo.find_or_create("hash-a", "2024-05-01", t(5)).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(again.started_at, t(0));

        let other_round = repo.find_or_create("hash-a", "2024-05-02", t(5)).await.unwrap();
        assert_ne!(first.id, other_round.id);
    }

    #[tokio::test]
    async fn test_question_count_stops_at_limit() {
        let repo = setup_test_db().await;
        let session = repo.find_or_create("hash-a", "2024-05-01", t(0)).await.unwrap();

        for expected in 1..=MAX_QUESTIONS {
            let count = repo
                .record_question(&session, "Er hún söngkona?", &yes(), Some(3), t(1))
                .await
                .unwrap();
            assert_eq!(count, Some(expected));
        }

        let rejected = repo
            .record_question(&session, "Ein í viðbót?", &yes(), None, t(2))
            .await
            .unwrap();
        assert_eq!(rejected, None);

        let stored = repo.find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.question_count, MAX_QUESTIONS);
        assert_eq!(
            repo.question_history(&session.id).await.unwrap().len(),
            MAX_QUESTIONS as usize
        );
    }

    #[tokio::test]
    async fn test_hint_only_once() {
        let repo = setup_test_db().await;
        let session = repo.find_or_create("hash-a", "2024-05-01", t(0)).await.unwrap();

        assert!(repo.mark_hint_used(&session.id).await.unwrap());
        assert!(!repo.mark_hint_used(&session.id).await.unwrap());
        assert!(repo.find_by_id(&session.id).await.unwrap().unwrap().hint_used);
    }

    #[tokio::test]
    async fn test_solving_is_monotonic() {
        let repo = setup_test_db().await;
        let session = repo.find_or_create("hash-a", "2024-05-01", t(0)).await.unwrap();

        let after_wrong = repo.record_guess(&session, "Egill", false, t(1)).await.unwrap();
        assert!(!after_wrong.solved);

        let solved = repo.record_guess(&session, "Björk", true, t(2)).await.unwrap();
        assert!(solved.solved);
        assert_eq!(solved.solved_at, Some(t(2)));

        let again = repo.record_guess(&solved, "björk", true, t(9)).await.unwrap();
        assert_eq!(again.solved_at, Some(t(2)));

        // solved sessions take no more questions
        assert_eq!(
            repo.record_question(&again, "Er hún kona?", &yes(), None, t(10))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_solved_for_round_attaches_usernames() {
        let db = connect_to_memory_database().await.unwrap();
        let repo = SessionRepository::new(db.clone());
        let names = crate::repositories::UsernameRepository::new(db);

        let a = repo.find_or_create("hash-a", "2024-05-01", t(0)).await.unwrap();
        let b = repo.find_or_create("hash-b", "2024-05-01", t(0)).await.unwrap();
        repo.find_or_create("hash-c", "2024-05-01", t(0)).await.unwrap();
        repo.record_guess(&a, "Björk", true, t(3)).await.unwrap();
        repo.record_guess(&b, "Björk", true, t(4)).await.unwrap();
        names.set("hash-a", "Anna", t(1)).await.unwrap();

        let mut solved = repo.solved_for_round("2024-05-01").await.unwrap();
        solved.sort_by_key(|s| s.solved_at);
        assert_eq!(solved.len(), 2);
        assert_eq!(solved[0].username.as_deref(), Some("Anna"));
        assert_eq!(solved[1].username, None);
    }

    #[tokio::test]
    async fn test_submissions_newest_first_and_flagged() {
        let repo = setup_test_db().await;
        let session = repo.find_or_create("hash-a", "2024-05-01", t(0)).await.unwrap();

        repo.record_question(&session, "Er hún söngkona?", &yes(), None, t(1))
            .await
            .unwrap();
        repo.record_question(
            &session,
            "Hmm?",
            &Answer::new(AnswerLabel::Unknown, "Ekki viss."),
            None,
            t(2),
        )
        .await
        .unwrap();
        repo.record_guess(&session, "Egill", false, t(3)).await.unwrap();

        let all = repo.list_submissions(Some("2024-05-01"), 50, false).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].kind, SubmissionKind::Guess);
        assert_eq!(all[0].is_correct, Some(false));
        assert!(all[1].flagged);
        assert!(!all[2].flagged);

        let flagged = repo.list_submissions(None, 50, true).await.unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].text, "Hmm?");

        let limited = repo.list_submissions(None, 2, false).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert!(repo.list_submissions(Some("2030-01-01"), 50, false).await.unwrap().is_empty());
    }
}
