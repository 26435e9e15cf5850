use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ServiceError;
use crate::resolver::{AnswerResolver, HeuristicClassifier, HeuristicResolver, IntentClassifier};
use crate::validation;
use game_core::{
    PersonCatalog, Round, RoundCalculator, RoundKey, RoundOptions, Session, hash_device_id,
    is_correct_guess, random_round_key, rank_solved, strip_guess_prefix,
};
use game_persistence::DatabaseManager;
use game_types::{
    CurrentRoundResponse, DebugRoundPerson, GameError, GuessOutcome, GuessRequest, HintOutcome,
    HintRequest, InputOutcome, InputRequest, Intent, LeaderboardResponse, MAX_QUESTIONS, Person,
    QuestionOutcome, QuestionRequest, RevealPerson, RoundDebugInfo, RoundStatus, SessionState,
    SessionView, SetUsernameRequest, StartSessionRequest, UsernameResponse,
};

/// Shown when neither the round nor the person carries a hint
const NO_HINT: &str = "Engin vísbending er til fyrir þessa umferð.";
const HINT_ACK: &str = "Vísbending móttekin.";
const WRONG_GUESS: &str = "Nei.";

/// Round and debug behaviour, usually taken from `Config`
#[derive(Debug, Clone, Copy)]
pub struct GameSettings {
    pub calculator: RoundCalculator,
    pub force_round_open: bool,
    pub dev_random_round_per_session: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            calculator: RoundCalculator::utc(),
            force_round_open: false,
            dev_random_round_per_session: false,
        }
    }
}

impl GameSettings {
    pub fn from_config(config: &Config) -> Self {
        let calculator = RoundCalculator::from_offset_hours(config.round_utc_offset_hours)
            .unwrap_or_else(|| {
                warn!(
                    "ROUND_UTC_OFFSET_HOURS {} out of range, using UTC",
                    config.round_utc_offset_hours
                );
                RoundCalculator::utc()
            });

        Self {
            calculator,
            force_round_open: config.force_round_open,
            dev_random_round_per_session: config.dev_random_round_per_session,
        }
    }

    fn debug_allowed(&self) -> bool {
        self.force_round_open || self.dev_random_round_per_session
    }
}

/// Request-level operations of the game. Every method takes the current time
/// so callers (and tests) decide what "now" is.
pub struct GameService {
    db: DatabaseManager,
    catalog: PersonCatalog,
    settings: GameSettings,
    resolver: Arc<dyn AnswerResolver>,
    classifier: Arc<dyn IntentClassifier>,
}

impl GameService {
    pub fn new(db: DatabaseManager, settings: GameSettings) -> Self {
        Self {
            db,
            catalog: PersonCatalog::default(),
            settings,
            resolver: Arc::new(HeuristicResolver),
            classifier: Arc::new(HeuristicClassifier),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn AnswerResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Seed the default persons so rounds can reference them
    pub async fn prepare(&self, now: DateTime<Utc>) -> Result<(), ServiceError> {
        self.db
            .persons()
            .seed_defaults(self.catalog.persons(), now)
            .await?;
        Ok(())
    }

    fn force_open(&self, requested: bool) -> bool {
        self.settings.force_round_open || requested
    }

    /// Sessions may be played against another round's clock only in the
    /// forced or random-round modes
    fn allow_mismatch(&self, force_open: bool) -> bool {
        force_open || self.settings.dev_random_round_per_session
    }

    /// Round at `now`, with an administrative status override applied unless
    /// the round is force-opened
    async fn round_at(
        &self,
        now: DateTime<Utc>,
        force_open: bool,
        round_override: Option<RoundKey>,
    ) -> Result<Round, ServiceError> {
        let options = RoundOptions {
            force_open,
            round_override,
        };
        let round = self.settings.calculator.current(now, options);
        if force_open {
            return Ok(round);
        }

        match self.db.rounds().status_override(&round.id()).await? {
            Some(status) => {
                debug!("Round {} status overridden to {}", round.id(), status.as_str());
                Ok(round.with_status_override(status, now))
            }
            None => Ok(round),
        }
    }

    async fn person_for_round(&self, round_id: &str) -> Result<Person, ServiceError> {
        Ok(self
            .db
            .rounds()
            .resolve_person(round_id, &self.catalog)
            .await?)
    }

    async fn load_session(&self, session_id: &str) -> Result<Session, ServiceError> {
        self.db
            .sessions()
            .find_by_id(session_id)
            .await?
            .ok_or(ServiceError::Game(GameError::SessionNotFound))
    }

    pub async fn current_round(
        &self,
        now: DateTime<Utc>,
    ) -> Result<CurrentRoundResponse, ServiceError> {
        let round = self.round_at(now, self.settings.force_round_open, None).await?;
        let person = self.person_for_round(&round.id()).await?;
        let debug_allowed = self.settings.debug_allowed();

        Ok(CurrentRoundResponse {
            round: round.info(),
            debug: RoundDebugInfo {
                force_round_open: self.settings.force_round_open,
                random_round_per_session: self.settings.dev_random_round_per_session,
                current_person_id: debug_allowed.then(|| person.id.clone()),
                current_person_name: debug_allowed.then(|| person.display_name.clone()),
            },
            reveal_person: (round.status == RoundStatus::Closed)
                .then(|| RevealPerson::from(&person)),
        })
    }

    /// Assigned person of any round, only while a debug mode is on
    pub async fn debug_round_person(
        &self,
        round_id: &str,
    ) -> Result<DebugRoundPerson, ServiceError> {
        let key = validation::round_id(round_id)?;
        let round_id = key.to_string();

        if !self.settings.debug_allowed() {
            return Ok(DebugRoundPerson {
                round_id,
                person_id: None,
                person_name: None,
            });
        }

        let person = self.person_for_round(&round_id).await?;
        Ok(DebugRoundPerson {
            round_id,
            person_id: Some(person.id),
            person_name: Some(person.display_name),
        })
    }

    pub async fn start_session(
        &self,
        request: StartSessionRequest,
        now: DateTime<Utc>,
    ) -> Result<SessionView, ServiceError> {
        let requested_device = validation::device_id(request.device_id.as_deref())?;
        let device_id = match requested_device {
            Some(device_id) if !request.fresh_device => device_id,
            _ => format!("anon-{}", Uuid::new_v4()),
        };

        let round_override = (request.randomize_round || self.settings.dev_random_round_per_session)
            .then(|| random_round_key(&mut rand::thread_rng()));
        let force_open = self.force_open(request.force_round_open);
        let round = self.round_at(now, force_open, round_override).await?;

        // The first session of a round freezes its person
        let person = self.catalog.assigned_for(&round.id());
        self.db.rounds().ensure_round(&round, person, now).await?;

        let session = self
            .db
            .sessions()
            .find_or_create(&hash_device_id(&device_id), &round.id(), now)
            .await?;

        info!("Session {} playing round {}", session.id, session.round_id);
        Ok(session.view())
    }

    pub async fn session_state(&self, session_id: &str) -> Result<SessionState, ServiceError> {
        let session_id = validation::session_id(session_id)?;
        let session = self.load_session(&session_id).await?;
        let questions = self.db.sessions().question_history(&session.id).await?;

        Ok(SessionState {
            session: session.view(),
            questions,
        })
    }

    pub async fn ask_question(
        &self,
        request: QuestionRequest,
        now: DateTime<Utc>,
    ) -> Result<QuestionOutcome, ServiceError> {
        let session_id = validation::session_id(&request.session_id)?;
        let question = validation::question(&request.question)?;
        self.answer_question(&session_id, &question, request.force_round_open, now)
            .await
    }

    async fn answer_question(
        &self,
        session_id: &str,
        question: &str,
        requested_force: bool,
        now: DateTime<Utc>,
    ) -> Result<QuestionOutcome, ServiceError> {
        let session = self.load_session(session_id).await?;
        let force_open = self.force_open(requested_force);
        let round = self.round_at(now, force_open, None).await?;
        session.ensure_question_allowed(&round, self.allow_mismatch(force_open))?;

        let person = self.person_for_round(&session.round_id).await?;
        let started = Instant::now();
        let answer = self.resolver.answer(question, &person).await;
        let latency_ms = started.elapsed().as_millis() as i64;

        let sessions = self.db.sessions();
        let Some(question_count) = sessions
            .record_question(&session, question, &answer, Some(latency_ms), now)
            .await?
        else {
            // Another request got there first
            let latest = self.load_session(session_id).await?;
            let err = if latest.solved {
                GameError::AlreadySolved
            } else {
                GameError::QuestionLimitReached
            };
            return Err(err.into());
        };

        debug!(
            "Session {} question {} answered {}",
            session.id,
            question_count,
            answer.label.as_str()
        );
        Ok(QuestionOutcome {
            answer_label: answer.label,
            answer_text: answer.text,
            question_count,
            remaining: MAX_QUESTIONS.saturating_sub(question_count),
        })
    }

    pub async fn use_hint(
        &self,
        request: HintRequest,
        now: DateTime<Utc>,
    ) -> Result<HintOutcome, ServiceError> {
        let session_id = validation::session_id(&request.session_id)?;
        self.reveal_hint(&session_id, request.force_round_open, now)
            .await
    }

    async fn reveal_hint(
        &self,
        session_id: &str,
        requested_force: bool,
        now: DateTime<Utc>,
    ) -> Result<HintOutcome, ServiceError> {
        let session = self.load_session(session_id).await?;
        let force_open = self.force_open(requested_force);
        let round = self.round_at(now, force_open, None).await?;
        session.ensure_hint_allowed(&round, self.allow_mismatch(force_open))?;

        let person = self.person_for_round(&session.round_id).await?;
        if !self.db.sessions().mark_hint_used(&session.id).await? {
            return Err(GameError::HintAlreadyUsed.into());
        }

        let hint = if person.hint.trim().is_empty() {
            NO_HINT.to_string()
        } else {
            person.hint
        };
        Ok(HintOutcome {
            hint,
            hint_used: true,
        })
    }

    pub async fn submit_guess(
        &self,
        request: GuessRequest,
        now: DateTime<Utc>,
    ) -> Result<GuessOutcome, ServiceError> {
        let session_id = validation::session_id(&request.session_id)?;
        let guess = validation::guess(&request.guess)?;
        self.check_guess(&session_id, &guess, request.force_round_open, now)
            .await
    }

    async fn check_guess(
        &self,
        session_id: &str,
        guess: &str,
        requested_force: bool,
        now: DateTime<Utc>,
    ) -> Result<GuessOutcome, ServiceError> {
        let session = self.load_session(session_id).await?;
        let force_open = self.force_open(requested_force);
        let round = self.round_at(now, force_open, None).await?;
        session.ensure_guess_allowed(&round, self.allow_mismatch(force_open))?;

        let person = self.person_for_round(&session.round_id).await?;
        let correct = is_correct_guess(guess, &person);
        let updated = self
            .db
            .sessions()
            .record_guess(&session, guess, correct, now)
            .await?;

        if correct && !session.solved {
            info!("Session {} solved round {}", updated.id, updated.round_id);
        }

        let reveal = updated.should_reveal(&round);
        Ok(GuessOutcome {
            correct,
            solved: updated.solved,
            reveal,
            reveal_person: reveal.then(|| RevealPerson::from(&person)),
            solved_at: updated.solved_at.map(|t| t.timestamp_millis()),
        })
    }

    /// Classify free text and dispatch it to question, guess or hint handling
    pub async fn handle_input(
        &self,
        request: InputRequest,
        now: DateTime<Utc>,
    ) -> Result<InputOutcome, ServiceError> {
        let session_id = validation::session_id(&request.session_id)?;
        let text = validation::input_text(&request.input)?;
        let force = request.force_round_open;

        let intent = self.classifier.classify(&text).await;
        debug!(?intent, "Routing free-text input");

        match intent {
            Intent::Hint => {
                let outcome = self.reveal_hint(&session_id, force, now).await?;
                Ok(InputOutcome::Hint {
                    hint: outcome.hint,
                    answer_text: HINT_ACK.to_string(),
                })
            }
            Intent::Guess => {
                // A bare lead-in ("gisk:") is played as a wrong guess
                let stripped = strip_guess_prefix(&text);
                let guess = if stripped.trim().is_empty() {
                    String::new()
                } else {
                    validation::guess(&stripped)?
                };
                let outcome = self.check_guess(&session_id, &guess, force, now).await?;
                Ok(InputOutcome::Guess {
                    correct: outcome.correct,
                    solved: outcome.solved,
                    reveal_person: outcome.reveal_person,
                    answer_text: if outcome.correct {
                        String::new()
                    } else {
                        WRONG_GUESS.to_string()
                    },
                })
            }
            Intent::Question => {
                let question = validation::question(&text)?;
                let outcome = self.answer_question(&session_id, &question, force, now).await?;
                Ok(InputOutcome::Question {
                    answer_label: outcome.answer_label,
                    answer_text: outcome.answer_text,
                    question_count: outcome.question_count,
                    remaining: outcome.remaining,
                })
            }
        }
    }

    pub async fn get_username(&self, device_id: &str) -> Result<UsernameResponse, ServiceError> {
        let device_id = validation::required_device_id(device_id)?;
        let username = self.db.usernames().get(&hash_device_id(&device_id)).await?;
        Ok(UsernameResponse { username })
    }

    pub async fn set_username(
        &self,
        request: SetUsernameRequest,
        now: DateTime<Utc>,
    ) -> Result<UsernameResponse, ServiceError> {
        let device_id = validation::required_device_id(&request.device_id)?;
        let username = validation::username(&request.username)?;

        let saved = self
            .db
            .usernames()
            .set(&hash_device_id(&device_id), &username, now)
            .await?;
        Ok(UsernameResponse {
            username: Some(saved),
        })
    }

    /// Ranked solvers of a round, today's round when none is given
    pub async fn leaderboard(
        &self,
        round_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<LeaderboardResponse, ServiceError> {
        let key = match round_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(round_id) => validation::round_id(round_id)?,
            None => self.settings.calculator.today(now),
        };
        let round_id = key.to_string();

        let (opens_at, _) = self.settings.calculator.window(key);
        let solved = self.db.sessions().solved_for_round(&round_id).await?;

        Ok(LeaderboardResponse {
            leaderboard: rank_solved(solved, opens_at),
            round_id,
        })
    }
}
