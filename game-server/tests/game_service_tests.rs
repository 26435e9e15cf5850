mod test_helpers;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use game_persistence::{DatabaseManager, connection::connect_to_memory_database};
use game_server::error::ServiceError;
use game_server::game_service::{GameService, GameSettings};
use game_server::resolver::AnswerResolver;
use game_types::{
    Answer, AnswerLabel, AssignRoundRequest, GameError, GuessRequest, HintRequest, InputOutcome,
    InputRequest, MAX_QUESTIONS, Person, QuestionRequest, RoundStatus, SetUsernameRequest,
    StartSessionRequest,
};
use test_helpers::*;

fn game_error(result: Result<impl std::fmt::Debug, ServiceError>) -> GameError {
    match result {
        Err(ServiceError::Game(err)) => err,
        other => panic!("expected game error, got {:?}", other),
    }
}

fn question(session_id: &str, text: &str) -> QuestionRequest {
    QuestionRequest {
        session_id: session_id.to_string(),
        question: text.to_string(),
        force_round_open: false,
    }
}

fn guess(session_id: &str, text: &str) -> GuessRequest {
    GuessRequest {
        session_id: session_id.to_string(),
        guess: text.to_string(),
        force_round_open: false,
    }
}

fn hint(session_id: &str) -> HintRequest {
    HintRequest {
        session_id: session_id.to_string(),
        force_round_open: false,
    }
}

fn input(session_id: &str, text: &str) -> InputRequest {
    InputRequest {
        session_id: session_id.to_string(),
        input: text.to_string(),
        force_round_open: false,
    }
}

#[tokio::test]
async fn test_same_device_resumes_session() {
    let setup = TestServerSetup::new().await;

    let first = setup.start_session("device-a", open_time()).await;
    let again = setup.start_session("device-a", at(14, 0)).await;
    let other = setup.start_session("device-b", open_time()).await;

    assert_eq!(first.round_id, ROUND_ID);
    assert_eq!(first.id, again.id);
    assert_ne!(first.id, other.id);
}

#[tokio::test]
async fn test_fresh_device_gets_new_session() {
    let setup = TestServerSetup::new().await;
    let first = setup.start_session("device-a", open_time()).await;

    let fresh = setup
        .game
        .start_session(
            StartSessionRequest {
                device_id: Some("device-a".to_string()),
                fresh_device: true,
                ..StartSessionRequest::default()
            },
            open_time(),
        )
        .await
        .unwrap();
    let anonymous = setup
        .game
        .start_session(StartSessionRequest::default(), open_time())
        .await
        .unwrap();

    assert_ne!(first.id, fresh.id);
    assert_ne!(fresh.id, anonymous.id);
}

#[tokio::test]
async fn test_question_limit_is_enforced() {
    let setup = TestServerSetup::new().await;
    let session = setup.start_session("device-a", open_time()).await;

    for i in 1..=MAX_QUESTIONS {
        let outcome = setup
            .game
            .ask_question(question(&session.id, "Er þetta tónlistarmaður?"), open_time())
            .await
            .unwrap();
        assert_eq!(outcome.question_count, i);
        assert_eq!(outcome.remaining, MAX_QUESTIONS - i);
    }

    let err = game_error(
        setup
            .game
            .ask_question(question(&session.id, "Ein spurning enn?"), open_time())
            .await,
    );
    assert_eq!(err, GameError::QuestionLimitReached);

    let state = setup.game.session_state(&session.id).await.unwrap();
    assert_eq!(state.session.question_count, MAX_QUESTIONS);
    assert_eq!(state.questions.len(), MAX_QUESTIONS as usize);
}

#[tokio::test]
async fn test_concurrent_questions_never_exceed_limit() {
    let setup = TestServerSetup::new().await;
    let session = setup.start_session("device-a", open_time()).await;

    let mut handles = Vec::new();
    for _ in 0..(MAX_QUESTIONS + 5) {
        let game = setup.game.clone();
        let session_id = session.id.clone();
        handles.push(tokio::spawn(async move {
            game.ask_question(question(&session_id, "Er þetta kona?"), open_time())
                .await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(ServiceError::Game(GameError::QuestionLimitReached)) => {}
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    assert_eq!(accepted, MAX_QUESTIONS);
    let state = setup.game.session_state(&session.id).await.unwrap();
    assert_eq!(state.session.question_count, MAX_QUESTIONS);
}

#[tokio::test]
async fn test_question_outside_window_is_rejected() {
    let setup = TestServerSetup::new().await;
    let session = setup.start_session("device-a", at(11, 0)).await;

    let err = game_error(
        setup
            .game
            .ask_question(question(&session.id, "Er þetta kona?"), at(11, 30))
            .await,
    );
    assert_eq!(err, GameError::RoundNotOpen);
}

#[tokio::test]
async fn test_session_from_another_day_is_rejected() {
    let setup = TestServerSetup::new().await;
    let session = setup.start_session("device-a", open_time()).await;
    let next_day = open_time() + Duration::days(1);

    let err = game_error(
        setup
            .game
            .ask_question(question(&session.id, "Er þetta kona?"), next_day)
            .await,
    );
    assert_eq!(err, GameError::SessionRoundMismatch);

    // Forcing the round open lets old sessions keep playing
    let forced = setup
        .game
        .ask_question(
            QuestionRequest {
                force_round_open: true,
                ..question(&session.id, "Er þetta kona?")
            },
            next_day,
        )
        .await
        .unwrap();
    assert_eq!(forced.question_count, 1);
}

#[tokio::test]
async fn test_unknown_session() {
    let setup = TestServerSetup::new().await;

    let err = game_error(
        setup
            .game
            .ask_question(question("missing", "Er þetta kona?"), open_time())
            .await,
    );
    assert_eq!(err, GameError::SessionNotFound);
}

#[tokio::test]
async fn test_hint_only_once() {
    let setup = TestServerSetup::new().await;
    let session = setup.start_session("device-a", open_time()).await;
    let person = assigned_person(ROUND_ID);

    let outcome = setup.game.use_hint(hint(&session.id), open_time()).await.unwrap();
    assert_eq!(outcome.hint, person.hint);
    assert!(outcome.hint_used);

    let err = game_error(setup.game.use_hint(hint(&session.id), open_time()).await);
    assert_eq!(err, GameError::HintAlreadyUsed);

    let state = setup.game.session_state(&session.id).await.unwrap();
    assert!(state.session.hint_used);
}

#[tokio::test]
async fn test_round_hint_override_is_served() {
    let setup = TestServerSetup::new().await;
    let person = assigned_person(ROUND_ID);
    setup
        .admin
        .assign_round(
            ROUND_ID,
            AssignRoundRequest {
                person_id: person.id.clone(),
                hint_text: Some("Sérstök vísbending dagsins.".to_string()),
                status_override: None,
            },
            open_time(),
        )
        .await
        .unwrap();

    let session = setup.start_session("device-a", open_time()).await;
    let outcome = setup.game.use_hint(hint(&session.id), open_time()).await.unwrap();
    assert_eq!(outcome.hint, "Sérstök vísbending dagsins.");
}

#[tokio::test]
async fn test_correct_guess_solves_and_reveals() {
    let setup = TestServerSetup::new().await;
    let session = setup.start_session("device-a", open_time()).await;
    let person = assigned_person(ROUND_ID);

    let wrong = setup
        .game
        .submit_guess(guess(&session.id, "Jón Sigurðsson"), open_time())
        .await
        .unwrap();
    assert!(!wrong.correct);
    assert!(!wrong.solved);
    assert!(wrong.reveal_person.is_none());

    let right = setup
        .game
        .submit_guess(guess(&session.id, &person.display_name.to_lowercase()), at(13, 5))
        .await
        .unwrap();
    assert!(right.correct);
    assert!(right.solved);
    assert!(right.reveal);
    assert_eq!(
        right.reveal_person.map(|p| p.display_name),
        Some(person.display_name.clone())
    );
    assert_eq!(right.solved_at, Some(at(13, 5).timestamp_millis()));

    let err = game_error(
        setup
            .game
            .ask_question(question(&session.id, "Er þetta kona?"), at(13, 6))
            .await,
    );
    assert_eq!(err, GameError::AlreadySolved);
}

#[tokio::test]
async fn test_guess_without_diacritics_matches() {
    let setup = TestServerSetup::new().await;
    let session = setup.start_session("device-a", open_time()).await;

    // 2024-05-01 hashes to Björk in the default catalog
    assert_eq!(assigned_person(ROUND_ID).id, "p-bjork");
    let outcome = setup
        .game
        .submit_guess(guess(&session.id, "bjork"), open_time())
        .await
        .unwrap();
    assert!(outcome.correct);
}

#[tokio::test]
async fn test_guess_after_close() {
    let setup = TestServerSetup::new().await;
    let unsolved = setup.start_session("device-a", open_time()).await;
    let solver = setup.start_session("device-b", open_time()).await;
    let person = assigned_person(ROUND_ID);

    setup
        .game
        .submit_guess(guess(&solver.id, &person.display_name), open_time())
        .await
        .unwrap();

    let err = game_error(
        setup
            .game
            .submit_guess(guess(&unsolved.id, &person.display_name), at(17, 30))
            .await,
    );
    assert_eq!(err, GameError::RoundNotOpen);

    // A solved session may still look at its result
    let again = setup
        .game
        .submit_guess(guess(&solver.id, &person.display_name), at(17, 30))
        .await
        .unwrap();
    assert!(again.solved);
    assert!(again.reveal);
}

#[tokio::test]
async fn test_free_text_routing() {
    let setup = TestServerSetup::new().await;
    let session = setup.start_session("device-a", open_time()).await;
    let person = assigned_person(ROUND_ID);

    match setup
        .game
        .handle_input(input(&session.id, "Er þessi persóna á lífi?"), open_time())
        .await
        .unwrap()
    {
        InputOutcome::Question { question_count, .. } => assert_eq!(question_count, 1),
        other => panic!("expected question, got {:?}", other),
    }

    match setup
        .game
        .handle_input(input(&session.id, "gefðu mér vísbendingu"), open_time())
        .await
        .unwrap()
    {
        InputOutcome::Hint { hint, .. } => assert_eq!(hint, person.hint),
        other => panic!("expected hint, got {:?}", other),
    }

    match setup
        .game
        .handle_input(input(&session.id, "gisk: Jón Páll"), open_time())
        .await
        .unwrap()
    {
        InputOutcome::Guess {
            correct,
            answer_text,
            ..
        } => {
            assert!(!correct);
            assert_eq!(answer_text, "Nei.");
        }
        other => panic!("expected guess, got {:?}", other),
    }

    let text = format!("Ég giska á {}", person.display_name);
    match setup
        .game
        .handle_input(input(&session.id, &text), open_time())
        .await
        .unwrap()
    {
        InputOutcome::Guess {
            correct,
            solved,
            reveal_person,
            ..
        } => {
            assert!(correct);
            assert!(solved);
            assert!(reveal_person.is_some());
        }
        other => panic!("expected guess, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bare_guess_lead_in_is_a_wrong_guess() {
    let setup = TestServerSetup::new().await;
    let session = setup.start_session("device-a", open_time()).await;

    match setup
        .game
        .handle_input(input(&session.id, "gisk:"), open_time())
        .await
        .unwrap()
    {
        InputOutcome::Guess {
            correct,
            solved,
            answer_text,
            ..
        } => {
            assert!(!correct);
            assert!(!solved);
            assert_eq!(answer_text, "Nei.");
        }
        other => panic!("expected guess, got {:?}", other),
    }

    let submissions = setup
        .admin
        .list_submissions(Some(ROUND_ID), None, false)
        .await
        .unwrap();
    assert_eq!(submissions.events.len(), 1);
    assert_eq!(submissions.events[0].is_correct, Some(false));
}

#[tokio::test]
async fn test_leaderboard_orders_solvers() {
    let setup = TestServerSetup::new().await;
    let person = assigned_person(ROUND_ID);

    let slow = setup.start_session("device-a", at(12, 0)).await;
    for _ in 0..3 {
        setup
            .game
            .ask_question(question(&slow.id, "Er þetta kona?"), at(12, 5))
            .await
            .unwrap();
    }
    setup
        .game
        .submit_guess(guess(&slow.id, &person.display_name), at(12, 10))
        .await
        .unwrap();

    let quick = setup.start_session("device-b", at(12, 30)).await;
    setup
        .game
        .submit_guess(guess(&quick.id, &person.display_name), at(12, 40))
        .await
        .unwrap();

    // Never solves
    setup.start_session("device-c", at(12, 0)).await;

    setup
        .game
        .set_username(
            SetUsernameRequest {
                device_id: "device-b".to_string(),
                username: "Fljót".to_string(),
            },
            at(12, 45),
        )
        .await
        .unwrap();

    let board = setup.game.leaderboard(None, at(13, 0)).await.unwrap();
    assert_eq!(board.round_id, ROUND_ID);
    assert_eq!(board.leaderboard.len(), 2);

    let first = &board.leaderboard[0];
    assert_eq!(first.rank, 1);
    assert_eq!(first.session_id, quick.id);
    assert_eq!(first.questions_used, 0);
    assert_eq!(first.username.as_deref(), Some("Fljót"));
    assert_eq!(first.time_from_open_ms, 40 * 60 * 1000);

    let second = &board.leaderboard[1];
    assert_eq!(second.rank, 2);
    assert_eq!(second.session_id, slow.id);
    assert_eq!(second.questions_used, 3);

    let other_day = setup
        .game
        .leaderboard(Some("2024-05-02"), at(13, 0))
        .await
        .unwrap();
    assert!(other_day.leaderboard.is_empty());

    let err = game_error(setup.game.leaderboard(Some("2024-02-30"), at(13, 0)).await);
    assert!(matches!(err, GameError::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_username_uniqueness() {
    let setup = TestServerSetup::new().await;

    let saved = setup
        .game
        .set_username(
            SetUsernameRequest {
                device_id: "device-a".to_string(),
                username: "  Sigga ".to_string(),
            },
            open_time(),
        )
        .await
        .unwrap();
    assert_eq!(saved.username.as_deref(), Some("Sigga"));

    let err = game_error(
        setup
            .game
            .set_username(
                SetUsernameRequest {
                    device_id: "device-b".to_string(),
                    username: "SIGGA".to_string(),
                },
                open_time(),
            )
            .await,
    );
    assert_eq!(err, GameError::UsernameTaken);

    let fetched = setup.game.get_username("device-a").await.unwrap();
    assert_eq!(fetched.username.as_deref(), Some("Sigga"));
    let missing = setup.game.get_username("device-b").await.unwrap();
    assert_eq!(missing.username, None);
}

#[tokio::test]
async fn test_current_round_hides_person_until_closed() {
    let setup = TestServerSetup::new().await;

    let open = setup.game.current_round(open_time()).await.unwrap();
    assert_eq!(open.round.status, RoundStatus::Open);
    assert!(open.reveal_person.is_none());
    assert!(open.debug.current_person_name.is_none());

    let closed = setup.game.current_round(at(18, 0)).await.unwrap();
    assert_eq!(closed.round.status, RoundStatus::Closed);
    assert_eq!(
        closed.reveal_person.map(|p| p.display_name),
        Some(assigned_person(ROUND_ID).display_name)
    );

    let debug = setup.game.debug_round_person(ROUND_ID).await.unwrap();
    assert_eq!(debug.person_id, None);
}

#[tokio::test]
async fn test_status_override_closes_round() {
    let setup = TestServerSetup::new().await;
    let person = assigned_person(ROUND_ID);
    let session = setup.start_session("device-a", open_time()).await;

    setup
        .admin
        .assign_round(
            ROUND_ID,
            AssignRoundRequest {
                person_id: person.id.clone(),
                hint_text: None,
                status_override: Some(RoundStatus::Closed),
            },
            open_time(),
        )
        .await
        .unwrap();

    let round = setup.game.current_round(open_time()).await.unwrap();
    assert_eq!(round.round.status, RoundStatus::Closed);
    assert!(round.reveal_person.is_some());

    let err = game_error(
        setup
            .game
            .ask_question(question(&session.id, "Er þetta kona?"), open_time())
            .await,
    );
    assert_eq!(err, GameError::RoundNotOpen);
}

#[tokio::test]
async fn test_assigned_person_replaces_hashed_pick() {
    let setup = TestServerSetup::new().await;
    setup
        .admin
        .assign_round(
            ROUND_ID,
            AssignRoundRequest {
                person_id: "p-vigdis".to_string(),
                hint_text: None,
                status_override: None,
            },
            open_time(),
        )
        .await
        .unwrap();

    let session = setup.start_session("device-a", open_time()).await;
    let outcome = setup
        .game
        .submit_guess(guess(&session.id, "Vigdís"), open_time())
        .await
        .unwrap();
    assert!(outcome.correct);
}

#[tokio::test]
async fn test_debug_modes_expose_person() {
    let setup = TestServerSetup::with_settings(forced_settings(), None).await;

    let round = setup.game.current_round(at(9, 0)).await.unwrap();
    assert_eq!(round.round.status, RoundStatus::Open);
    assert!(round.debug.force_round_open);
    assert_eq!(
        round.debug.current_person_name,
        Some(assigned_person(ROUND_ID).display_name)
    );

    let debug = setup.game.debug_round_person("2024-05-05").await.unwrap();
    assert_eq!(debug.person_id, Some(assigned_person("2024-05-05").id));
}

#[tokio::test]
async fn test_random_round_per_session() {
    let settings = GameSettings {
        dev_random_round_per_session: true,
        ..GameSettings::default()
    };
    let setup = TestServerSetup::with_settings(settings, None).await;

    let session = setup.start_session("device-a", open_time()).await;
    let year: i32 = session.round_id[..4].parse().unwrap();
    assert!((2000..=2099).contains(&year));

    // Random rounds are playable even though today's round has another id
    let outcome = setup
        .game
        .ask_question(question(&session.id, "Er þetta kona?"), open_time())
        .await
        .unwrap();
    assert_eq!(outcome.question_count, 1);
}

struct FixedResolver;

#[async_trait]
impl AnswerResolver for FixedResolver {
    async fn answer(&self, _question: &str, _person: &Person) -> Answer {
        Answer::new(AnswerLabel::ProbablyYes, "Líklega.")
    }
}

#[tokio::test]
async fn test_custom_resolver_answers_are_stored() {
    let connection = connect_to_memory_database().await.unwrap();
    let db = DatabaseManager::from_connection(connection);
    let game = GameService::new(db.clone(), GameSettings::default())
        .with_resolver(Arc::new(FixedResolver));
    game.prepare(open_time()).await.unwrap();
    let setup = TestServerSetup::from_game(db, game);

    let session = setup.start_session("device-a", open_time()).await;
    let outcome = setup
        .game
        .ask_question(question(&session.id, "Er þetta tónlistarmaður?"), open_time())
        .await
        .unwrap();
    assert_eq!(outcome.answer_label, AnswerLabel::ProbablyYes);
    assert_eq!(outcome.answer_text, "Líklega.");

    let state = setup.game.session_state(&session.id).await.unwrap();
    assert_eq!(state.questions[0].answer_label, AnswerLabel::ProbablyYes);
    assert_eq!(state.questions[0].question, "Er þetta tónlistarmaður?");
}

#[tokio::test]
async fn test_round_window_uses_offset() {
    let settings = GameSettings {
        calculator: game_core::RoundCalculator::from_offset_hours(2).unwrap(),
        ..GameSettings::default()
    };
    let setup = TestServerSetup::with_settings(settings, None).await;

    // 11:00 UTC is 13:00 local
    let round = setup
        .game
        .current_round(Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap())
        .await
        .unwrap();
    assert_eq!(round.round.status, RoundStatus::Open);
    assert_eq!(
        round.round.opens_at,
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap().timestamp_millis()
    );
}
