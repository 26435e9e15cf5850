use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use super::{LlmClient, LlmError};
use crate::resolver::{AnswerResolver, heuristic_answer};
use game_core::{
    filter_disclosures, is_gender_question, is_gender_refusal_answer, short_answer_for_label,
};
use game_types::{Answer, AnswerLabel, Person};

const MAX_ANSWER_CHARS: usize = 90;

fn system_prompt() -> String {
    [
        "Role: You are the strict game master for \"Hver er maðurinn?\".",
        "Language: Always answer in Icelandic.",
        "You must answer clearly and briefly (one short sentence).",
        "Prefer direct labels: yes/no whenever possible; use unknown only when evidence is genuinely insufficient.",
        "For factual binary questions (e.g. nationality/profession), avoid unknown unless the provided facts truly do not decide it.",
        "Never reveal or confirm the exact person name directly.",
        "Gender questions are allowed and should be answered normally.",
        "Examples:",
        "- Q: \"Er manneskjan íslendingur?\" -> {\"answerLabel\":\"yes\",\"answerText\":\"Já.\"} or {\"answerLabel\":\"no\",\"answerText\":\"Nei.\"}",
        "- Q: \"Er hún tónlistarkona?\" -> short yes/no/unknown based on facts.",
        "Output STRICT JSON only: {\"answerLabel\":\"yes|no|unknown|probably_yes|probably_no\",\"answerText\":\"short icelandic sentence\"}.",
        "Do not output markdown or any text outside JSON.",
    ]
    .join("\n")
}

fn user_prompt(question: &str, person: &Person) -> String {
    format!(
        "Target person name: {}\nKnown aliases: {}\nKnown nationality flag (is Icelandic): {}\nBio: {}\nHint: {}\nQuestion: {}",
        person.display_name,
        person.aliases.join(", "),
        if person.is_icelander { "yes" } else { "no" },
        person.reveal_text,
        person.hint,
        question
    )
}

/// One short sentence: whitespace collapsed, cut at the first sentence end,
/// clipped to 90 characters and terminated with punctuation.
pub fn normalize_answer_text(label: AnswerLabel, raw: &str) -> String {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let first_sentence = cleaned
        .char_indices()
        .find(|(i, c)| {
            matches!(*c, '.' | '!' | '?') && cleaned[*i + c.len_utf8()..].starts_with(' ')
        })
        .map(|(i, _)| cleaned[..i].trim())
        .unwrap_or(cleaned.as_str());
    let candidate = if first_sentence.is_empty() {
        cleaned.as_str()
    } else {
        first_sentence
    };

    if candidate.is_empty() {
        return short_answer_for_label(label).to_string();
    }

    let clipped = if candidate.chars().count() > MAX_ANSWER_CHARS {
        let head: String = candidate.chars().take(MAX_ANSWER_CHARS - 1).collect();
        format!("{}…", head)
    } else {
        candidate.to_string()
    };

    if clipped.ends_with(['.', '!', '?']) {
        clipped
    } else {
        format!("{}.", clipped)
    }
}

fn parse_answer(value: &Value) -> Answer {
    let label = AnswerLabel::parse_lenient(value["answerLabel"].as_str().unwrap_or("unknown"));
    let raw_text = value["answerText"]
        .as_str()
        .or_else(|| value["answerTextIs"].as_str())
        .unwrap_or_default();
    Answer::new(label, normalize_answer_text(label, raw_text))
}

/// Model-backed resolver with the heuristic as fallback
pub struct LlmAnswerResolver {
    client: LlmClient,
}

impl LlmAnswerResolver {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    async fn ask(&self, question: &str, person: &Person) -> Result<Answer, LlmError> {
        let value = self
            .client
            .complete_json(&system_prompt(), &user_prompt(question, person))
            .await?;
        Ok(parse_answer(&value))
    }
}

#[async_trait]
impl AnswerResolver for LlmAnswerResolver {
    async fn answer(&self, question: &str, person: &Person) -> Answer {
        let provider = self.client.provider().as_str();

        match self.ask(question, person).await {
            Ok(answer) if is_gender_question(question) && is_gender_refusal_answer(&answer.text) => {
                info!(provider, "Model refused a gender question, using heuristic");
                heuristic_answer(question, person)
            }
            Ok(answer) => {
                info!(provider, label = answer.label.as_str(), "Model answered question");
                filter_disclosures(question, answer)
            }
            Err(err) => {
                warn!(provider, "Model answer failed, using heuristic: {}", err);
                heuristic_answer(question, person)
            }
        }
    }
}
