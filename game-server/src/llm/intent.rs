use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{LlmClient, LlmError};
use crate::resolver::IntentClassifier;
use game_core::classify_heuristic;
use game_types::Intent;

const SYSTEM_PROMPT: &str = "You route player input for an Icelandic 20-questions game about a hidden person.\n\
Classify the input as exactly one of:\n\
- question: a yes/no question about the person\n\
- guess: the player names who they think the person is\n\
- hint: the player asks for a hint\n\
Output STRICT JSON only: {\"intent\":\"question|guess|hint\"}.";

fn parse_intent(value: &Value) -> Option<Intent> {
    match value["intent"].as_str()?.trim().to_lowercase().as_str() {
        "question" => Some(Intent::Question),
        "guess" => Some(Intent::Guess),
        "hint" => Some(Intent::Hint),
        _ => None,
    }
}

/// Rules first, the model only for input the rules cannot place
pub struct LlmIntentClassifier {
    client: LlmClient,
}

impl LlmIntentClassifier {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    async fn ask(&self, input: &str) -> Result<Option<Intent>, LlmError> {
        let value = self
            .client
            .complete_json(SYSTEM_PROMPT, &format!("Input: {}", input))
            .await?;
        Ok(parse_intent(&value))
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, input: &str) -> Intent {
        if let Some(intent) = classify_heuristic(input) {
            return intent;
        }

        let provider = self.client.provider().as_str();
        match self.ask(input).await {
            Ok(Some(intent)) => {
                debug!(provider, ?intent, "Model classified input");
                intent
            }
            Ok(None) => {
                warn!(provider, "Model returned no usable intent, treating as question");
                Intent::Question
            }
            Err(err) => {
                warn!(provider, "Intent classification failed, treating as question: {}", err);
                Intent::Question
            }
        }
    }
}
