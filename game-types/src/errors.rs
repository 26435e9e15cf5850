use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Named failure conditions surfaced directly to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum GameError {
    #[error("session not found")]
    SessionNotFound,
    #[error("session belongs to a different round")]
    SessionRoundMismatch,
    #[error("round is not open")]
    RoundNotOpen,
    #[error("round already solved")]
    AlreadySolved,
    #[error("question limit reached")]
    QuestionLimitReached,
    #[error("hint already used")]
    HintAlreadyUsed,
    #[error("username is taken")]
    UsernameTaken,
    #[error("person not found")]
    PersonNotFound,
    #[error("round not found")]
    RoundNotFound,
    #[error("admin token is not configured")]
    AdminTokenNotConfigured,
    #[error("admin token missing")]
    AdminTokenMissing,
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

impl GameError {
    pub fn invalid(message: impl Into<String>) -> Self {
        GameError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Stable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            GameError::SessionNotFound => "SESSION_NOT_FOUND",
            GameError::SessionRoundMismatch => "SESSION_ROUND_MISMATCH",
            GameError::RoundNotOpen => "ROUND_NOT_OPEN",
            GameError::AlreadySolved => "ALREADY_SOLVED",
            GameError::QuestionLimitReached => "QUESTION_LIMIT_REACHED",
            GameError::HintAlreadyUsed => "HINT_ALREADY_USED",
            GameError::UsernameTaken => "USERNAME_TAKEN",
            GameError::PersonNotFound => "PERSON_NOT_FOUND",
            GameError::RoundNotFound => "ROUND_NOT_FOUND",
            GameError::AdminTokenNotConfigured => "ADMIN_TOKEN_NOT_CONFIGURED",
            GameError::AdminTokenMissing => "ADMIN_TOKEN_MISSING",
            GameError::Unauthorized => "UNAUTHORIZED",
            GameError::InvalidRequest { .. } => "INVALID_REQUEST",
        }
    }
}
