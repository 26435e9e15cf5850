use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StartSessionRequest {
    pub device_id: Option<String>,
    #[serde(default)]
    pub randomize_round: bool,
    #[serde(default)]
    pub fresh_device: bool,
    #[serde(default)]
    pub force_round_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionRequest {
    pub session_id: String,
    pub question: String,
    #[serde(default)]
    pub force_round_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessRequest {
    pub session_id: String,
    pub guess: String,
    #[serde(default)]
    pub force_round_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HintRequest {
    pub session_id: String,
    #[serde(default)]
    pub force_round_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InputRequest {
    pub session_id: String,
    pub input: String,
    #[serde(default)]
    pub force_round_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SetUsernameRequest {
    pub device_id: String,
    pub username: String,
}
