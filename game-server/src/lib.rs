use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use warp::Filter;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

use crate::admin::AdminService;
use crate::config::Config;
use crate::error::{ServiceError, handle_rejection};
use crate::game_service::GameService;
use crate::llm::{LlmAnswerResolver, LlmClient, LlmIntentClassifier};
use crate::resolver::{AnswerResolver, HeuristicClassifier, HeuristicResolver, IntentClassifier};
use game_types::{
    AssignRoundRequest, CreatePersonRequest, GuessRequest, HintRequest, InputRequest,
    QuestionRequest, SetUsernameRequest, StartSessionRequest,
};

pub mod admin;
pub mod auth;
pub mod config;
pub mod error;
pub mod game_service;
pub mod llm;
pub mod resolver;
pub mod validation;

const MAX_BODY_BYTES: u64 = 16 * 1024;

#[derive(Deserialize)]
struct LeaderboardQuery {
    round_id: Option<String>,
}

#[derive(Deserialize)]
struct UsernameQuery {
    device_id: Option<String>,
}

#[derive(Deserialize)]
struct SubmissionsQuery {
    round_id: Option<String>,
    limit: Option<u64>,
    #[serde(default)]
    flagged: bool,
}

/// Answer resolver and intent classifier for the configured provider,
/// heuristic only when no model is configured
pub fn build_ai(config: &Config) -> (Arc<dyn AnswerResolver>, Arc<dyn IntentClassifier>) {
    let Some(llm) = config.llm.clone() else {
        info!("No LLM configured, using heuristic answers");
        return (Arc::new(HeuristicResolver), Arc::new(HeuristicClassifier));
    };

    match LlmClient::new(llm) {
        Ok(client) => {
            info!("Answering with LLM provider {}", client.provider().as_str());
            (
                Arc::new(LlmAnswerResolver::new(client.clone())),
                Arc::new(LlmIntentClassifier::new(client)),
            )
        }
        Err(e) => {
            warn!("Failed to build LLM client, using heuristic answers: {}", e);
            (Arc::new(HeuristicResolver), Arc::new(HeuristicClassifier))
        }
    }
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: for<'de> Deserialize<'de> + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn respond<T: Serialize>(
    result: Result<T, ServiceError>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    Ok(match result {
        Ok(body) => warp::reply::with_status(warp::reply::json(&body), StatusCode::OK),
        Err(e) => e.into_reply(),
    })
}

pub fn create_routes(
    game_service: Arc<GameService>,
    admin_service: Arc<AdminService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let game_filter = warp::any().map({
        let game_service = game_service.clone();
        move || game_service.clone()
    });

    let admin_filter = warp::any().map({
        let admin_service = admin_service.clone();
        move || admin_service.clone()
    });

    let authorization = warp::header::optional::<String>("authorization");

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let current_round = warp::path!("api" / "round")
        .and(warp::get())
        .and(game_filter.clone())
        .and_then(handle_current_round);

    let round_debug = warp::path!("api" / "round" / String / "debug")
        .and(warp::get())
        .and(game_filter.clone())
        .and_then(handle_round_debug);

    let start_session = warp::path!("api" / "session")
        .and(warp::post())
        .and(json_body::<StartSessionRequest>())
        .and(game_filter.clone())
        .and_then(handle_start_session);

    let session_state = warp::path!("api" / "session" / String)
        .and(warp::get())
        .and(game_filter.clone())
        .and_then(handle_session_state);

    let question = warp::path!("api" / "question")
        .and(warp::post())
        .and(json_body::<QuestionRequest>())
        .and(game_filter.clone())
        .and_then(handle_question);

    let guess = warp::path!("api" / "guess")
        .and(warp::post())
        .and(json_body::<GuessRequest>())
        .and(game_filter.clone())
        .and_then(handle_guess);

    let hint = warp::path!("api" / "hint")
        .and(warp::post())
        .and(json_body::<HintRequest>())
        .and(game_filter.clone())
        .and_then(handle_hint);

    let input = warp::path!("api" / "input")
        .and(warp::post())
        .and(json_body::<InputRequest>())
        .and(game_filter.clone())
        .and_then(handle_input);

    let get_username = warp::path!("api" / "username")
        .and(warp::get())
        .and(warp::query::<UsernameQuery>())
        .and(game_filter.clone())
        .and_then(handle_get_username);

    let set_username = warp::path!("api" / "username")
        .and(warp::post())
        .and(json_body::<SetUsernameRequest>())
        .and(game_filter.clone())
        .and_then(handle_set_username);

    let leaderboard = warp::path!("api" / "leaderboard")
        .and(warp::get())
        .and(warp::query::<LeaderboardQuery>())
        .and(game_filter.clone())
        .and_then(handle_leaderboard);

    let list_persons = warp::path!("api" / "admin" / "persons")
        .and(warp::get())
        .and(authorization.clone())
        .and(admin_filter.clone())
        .and_then(handle_list_persons);

    let create_person = warp::path!("api" / "admin" / "persons")
        .and(warp::post())
        .and(authorization.clone())
        .and(json_body::<CreatePersonRequest>())
        .and(admin_filter.clone())
        .and_then(handle_create_person);

    let get_round = warp::path!("api" / "admin" / "rounds" / String)
        .and(warp::get())
        .and(authorization.clone())
        .and(admin_filter.clone())
        .and_then(handle_get_round);

    let assign_round = warp::path!("api" / "admin" / "rounds" / String)
        .and(warp::put())
        .and(authorization.clone())
        .and(json_body::<AssignRoundRequest>())
        .and(admin_filter.clone())
        .and_then(handle_assign_round);

    let submissions = warp::path!("api" / "admin" / "submissions")
        .and(warp::get())
        .and(warp::query::<SubmissionsQuery>())
        .and(authorization)
        .and(admin_filter)
        .and_then(handle_submissions);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "PUT"]);

    let game_routes = current_round
        .or(round_debug)
        .or(start_session)
        .or(session_state)
        .or(question)
        .or(guess)
        .or(hint)
        .or(input)
        .or(get_username)
        .or(set_username)
        .or(leaderboard);

    let admin_routes = list_persons
        .or(create_person)
        .or(get_round)
        .or(assign_round)
        .or(submissions);

    health
        .or(game_routes)
        .or(admin_routes)
        .recover(handle_rejection)
        .with(cors)
        .with(warp::log("hver_er_madurinn"))
}

async fn handle_current_round(game: Arc<GameService>) -> Result<WithStatus<Json>, warp::Rejection> {
    respond(game.current_round(Utc::now()).await)
}

async fn handle_round_debug(
    round_id: String,
    game: Arc<GameService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    respond(game.debug_round_person(&round_id).await)
}

async fn handle_start_session(
    request: StartSessionRequest,
    game: Arc<GameService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    respond(game.start_session(request, Utc::now()).await)
}

async fn handle_session_state(
    session_id: String,
    game: Arc<GameService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    respond(game.session_state(&session_id).await)
}

async fn handle_question(
    request: QuestionRequest,
    game: Arc<GameService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    respond(game.ask_question(request, Utc::now()).await)
}

async fn handle_guess(
    request: GuessRequest,
    game: Arc<GameService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    respond(game.submit_guess(request, Utc::now()).await)
}

async fn handle_hint(
    request: HintRequest,
    game: Arc<GameService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    respond(game.use_hint(request, Utc::now()).await)
}

async fn handle_input(
    request: InputRequest,
    game: Arc<GameService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    respond(game.handle_input(request, Utc::now()).await)
}

async fn handle_get_username(
    query: UsernameQuery,
    game: Arc<GameService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    let device_id = query.device_id.unwrap_or_default();
    respond(game.get_username(&device_id).await)
}

async fn handle_set_username(
    request: SetUsernameRequest,
    game: Arc<GameService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    respond(game.set_username(request, Utc::now()).await)
}

async fn handle_leaderboard(
    query: LeaderboardQuery,
    game: Arc<GameService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    respond(game.leaderboard(query.round_id.as_deref(), Utc::now()).await)
}

async fn handle_list_persons(
    auth_header: Option<String>,
    admin: Arc<AdminService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    if let Err(e) = admin.authorize(auth_header.as_deref()) {
        return Ok(e.into_reply());
    }
    respond(admin.list_persons().await)
}

async fn handle_create_person(
    auth_header: Option<String>,
    request: CreatePersonRequest,
    admin: Arc<AdminService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    if let Err(e) = admin.authorize(auth_header.as_deref()) {
        return Ok(e.into_reply());
    }
    respond(admin.create_person(request, Utc::now()).await)
}

async fn handle_get_round(
    round_id: String,
    auth_header: Option<String>,
    admin: Arc<AdminService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    if let Err(e) = admin.authorize(auth_header.as_deref()) {
        return Ok(e.into_reply());
    }
    respond(admin.get_round(&round_id).await)
}

async fn handle_assign_round(
    round_id: String,
    auth_header: Option<String>,
    request: AssignRoundRequest,
    admin: Arc<AdminService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    if let Err(e) = admin.authorize(auth_header.as_deref()) {
        return Ok(e.into_reply());
    }
    respond(admin.assign_round(&round_id, request, Utc::now()).await)
}

async fn handle_submissions(
    query: SubmissionsQuery,
    auth_header: Option<String>,
    admin: Arc<AdminService>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    if let Err(e) = admin.authorize(auth_header.as_deref()) {
        return Ok(e.into_reply());
    }
    respond(
        admin
            .list_submissions(query.round_id.as_deref(), query.limit, query.flagged)
            .await,
    )
}
