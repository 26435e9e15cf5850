use std::env;
use std::str::FromStr;

use tracing::warn;

/// Placeholder shipped in sample env files, treated as unset
const ADMIN_TOKEN_PLACEHOLDER: &str = "CHANGE_ME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Gemini,
    /// Any `/chat/completions` API (OpenAI, Kimi, local gateways)
    OpenAiCompatible,
}

impl LlmProvider {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "gemini" => Some(LlmProvider::Gemini),
            "openai" | "openai-compatible" | "kimi" => Some(LlmProvider::OpenAiCompatible),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::OpenAiCompatible => "openai-compatible",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini-2.5-flash-lite",
            LlmProvider::OpenAiCompatible => "gpt-4o-mini",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            LlmProvider::OpenAiCompatible => "https://api.openai.com/v1",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub round_utc_offset_hours: i32,
    pub force_round_open: bool,
    pub dev_random_round_per_session: bool,
    pub admin_token: Option<String>,
    /// `None` when no API key is configured, answers are heuristic only
    pub llm: Option<LlmConfig>,
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {} '{}', using default", key, raw);
            default
        }),
        None => default,
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> bool {
    lookup(key)
        .map(|raw| matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl Config {
    pub fn new() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, used by `new` with the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let admin_token = lookup("ADMIN_TOKEN")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty() && token != ADMIN_TOKEN_PLACEHOLDER);

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080),
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| {
                game_persistence::connection::DEFAULT_DATABASE_URL.to_string()
            }),
            round_utc_offset_hours: parse_or(&lookup, "ROUND_UTC_OFFSET_HOURS", 0),
            force_round_open: parse_flag(&lookup, "FORCE_ROUND_OPEN"),
            dev_random_round_per_session: parse_flag(&lookup, "DEV_RANDOM_ROUND_PER_SESSION"),
            admin_token,
            llm: Self::llm_from_lookup(&lookup),
        }
    }

    fn llm_from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Option<LlmConfig> {
        let api_key = lookup("LLM_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())?;

        let provider_name = lookup("LLM_PROVIDER").unwrap_or_else(|| "gemini".to_string());
        let Some(provider) = LlmProvider::parse(&provider_name) else {
            warn!("Unknown LLM_PROVIDER '{}', answers will be heuristic", provider_name);
            return None;
        };

        let model = lookup("LLM_MODEL")
            .map(|model| model.trim().to_string())
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());
        let base_url = lookup("LLM_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| provider.default_base_url().to_string());

        Some(LlmConfig {
            provider,
            api_key,
            model,
            base_url,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
