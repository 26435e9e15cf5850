pub mod answer;
pub mod intent;

use std::time::Duration;

use reqwest::{Client, StatusCode, header::RETRY_AFTER};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::{LlmConfig, LlmProvider};

pub use answer::LlmAnswerResolver;
pub use intent::LlmIntentClassifier;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
/// Wait before the single 429 retry when the provider gives no `Retry-After`
const DEFAULT_RETRY_WAIT: Duration = Duration::from_millis(500);
/// Longest `Retry-After` honoured before giving up on the retry wait
const MAX_RETRY_WAIT: Duration = Duration::from_secs(3);
const TEMPERATURE: f64 = 0.2;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate limited by provider")]
    RateLimited,
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider response had no text")]
    EmptyResponse,
    #[error("provider text was not a JSON object")]
    BadJson,
}

/// Thin JSON-in/JSON-out client for the configured model provider
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    config: LlmConfig,
}

fn retry_wait(response: &reqwest::Response) -> Duration {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_WAIT)
        .min(MAX_RETRY_WAIT)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Pull the outermost `{...}` out of model text that may carry prose or
/// code fences around it
pub fn extract_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&text[start..=end])
        .ok()
        .filter(Value::is_object)
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, config })
    }

    pub fn provider(&self) -> LlmProvider {
        self.config.provider
    }

    fn request(&self, system: &str, user: &str) -> reqwest::RequestBuilder {
        match self.config.provider {
            LlmProvider::Gemini => {
                let url = format!(
                    "{}/models/{}:generateContent",
                    self.config.base_url, self.config.model
                );
                self.http
                    .post(url)
                    .query(&[("key", self.config.api_key.as_str())])
                    .json(&json!({
                        "systemInstruction": { "parts": [{ "text": system }] },
                        "contents": [{ "role": "user", "parts": [{ "text": user }] }],
                        "generationConfig": {
                            "temperature": TEMPERATURE,
                            "responseMimeType": "application/json"
                        }
                    }))
            }
            LlmProvider::OpenAiCompatible => self
                .http
                .post(format!("{}/chat/completions", self.config.base_url))
                .bearer_auth(&self.config.api_key)
                .json(&json!({
                    "model": self.config.model,
                    "temperature": TEMPERATURE,
                    "response_format": { "type": "json_object" },
                    "messages": [
                        { "role": "system", "content": system },
                        { "role": "user", "content": user }
                    ]
                })),
        }
    }

    fn response_text(&self, data: &Value) -> Option<String> {
        let text = match self.config.provider {
            LlmProvider::Gemini => data["candidates"][0]["content"]["parts"][0]["text"].as_str(),
            LlmProvider::OpenAiCompatible => data["choices"][0]["message"]["content"].as_str(),
        };
        text.map(str::to_string)
    }

    /// Send the prompt and parse the JSON object the model answered with.
    /// A 429 is retried once after the provider's `Retry-After` (capped).
    pub async fn complete_json(&self, system: &str, user: &str) -> Result<Value, LlmError> {
        let provider = self.config.provider.as_str();

        let mut response = self.request(system, user).send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let wait = retry_wait(&response);
            info!(provider, wait_ms = wait.as_millis() as u64, "Rate limited, retrying once");
            tokio::time::sleep(wait).await;
            response = self.request(system, user).send().await?;
        }

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(provider, "Still rate limited after retry");
            return Err(LlmError::RateLimited);
        }
        let body = response.text().await?;
        if !status.is_success() {
            warn!(provider, status = status.as_u16(), "Provider HTTP error");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate(&body, 300),
            });
        }

        let data: Value = serde_json::from_str(&body).map_err(|_| LlmError::BadJson)?;
        let text = self.response_text(&data).ok_or(LlmError::EmptyResponse)?;
        debug!(provider, "Provider text: {}", truncate(&text, 220));

        extract_json(&text).ok_or(LlmError::BadJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_noisy_text() {
        let value = extract_json("```json\n{\"answerLabel\":\"yes\"}\n```").unwrap();
        assert_eq!(value["answerLabel"], "yes");
        assert!(extract_json("no braces here").is_none());
        assert!(extract_json("} backwards {").is_none());
        assert!(extract_json("{not json}").is_none());
    }

    #[test]
    fn test_truncate_respects_chars() {
        assert_eq!(truncate("þþþþ", 2), "þþ");
    }
}
