use std::convert::Infallible;

use serde::Serialize;
use tracing::error;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

use game_types::GameError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("storage error: {0}")]
    Storage(anyhow::Error),
}

/// Repositories report domain failures (taken username, unknown person)
/// inside `anyhow`; recover them so they keep their code.
impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<GameError>() {
            Ok(game) => ServiceError::Game(game),
            Err(err) => ServiceError::Storage(err),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(err: sea_orm::DbErr) -> Self {
        ServiceError::Storage(err.into())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

pub fn status_for(err: &GameError) -> StatusCode {
    match err {
        GameError::SessionNotFound | GameError::PersonNotFound | GameError::RoundNotFound => {
            StatusCode::NOT_FOUND
        }
        GameError::SessionRoundMismatch
        | GameError::RoundNotOpen
        | GameError::AlreadySolved
        | GameError::QuestionLimitReached
        | GameError::HintAlreadyUsed
        | GameError::UsernameTaken => StatusCode::CONFLICT,
        GameError::AdminTokenNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        GameError::AdminTokenMissing | GameError::Unauthorized => StatusCode::UNAUTHORIZED,
        GameError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
    }
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Game(err) => status_for(err),
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ServiceError::Game(err) => ErrorBody {
                error: err.code().to_string(),
                message: err.to_string(),
            },
            // storage details stay in the log
            ServiceError::Storage(_) => ErrorBody {
                error: "INTERNAL_ERROR".to_string(),
                message: "internal error".to_string(),
            },
        }
    }

    pub fn into_reply(self) -> WithStatus<Json> {
        if let ServiceError::Storage(err) = &self {
            error!("Request failed: {:#}", err);
        }
        warp::reply::with_status(warp::reply::json(&self.body()), self.status())
    }
}

/// Turns warp rejections (bad JSON, unknown path) into the same error body
pub async fn handle_rejection(rejection: warp::Rejection) -> Result<WithStatus<Json>, Infallible> {
    let (status, code, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "NOT_FOUND", "not found".to_string())
    } else if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.to_string())
    } else if let Some(err) = rejection.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "METHOD_NOT_ALLOWED",
            "method not allowed".to_string(),
        )
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "INVALID_REQUEST",
            "payload too large".to_string(),
        )
    } else {
        error!("Unhandled rejection: {:?}", rejection);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "internal error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            error: code.to_string(),
            message,
        }),
        status,
    ))
}
