use async_trait::async_trait;

use game_core::{answer_question_for_person, classify_heuristic, filter_disclosures};
use game_types::{Answer, Intent, Person};

/// Answers a yes/no question about the hidden person. Implementations never
/// fail: any external problem degrades to the keyword heuristic.
#[async_trait]
pub trait AnswerResolver: Send + Sync {
    async fn answer(&self, question: &str, person: &Person) -> Answer;
}

/// Routes free text to question, guess or hint handling
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, input: &str) -> Intent;
}

/// Keyword matching with the disclosure filter applied
pub struct HeuristicResolver;

pub fn heuristic_answer(question: &str, person: &Person) -> Answer {
    filter_disclosures(question, answer_question_for_person(question, person))
}

#[async_trait]
impl AnswerResolver for HeuristicResolver {
    async fn answer(&self, question: &str, person: &Person) -> Answer {
        heuristic_answer(question, person)
    }
}

/// Rules only, undecided input is treated as a question
pub struct HeuristicClassifier;

#[async_trait]
impl IntentClassifier for HeuristicClassifier {
    async fn classify(&self, input: &str) -> Intent {
        classify_heuristic(input).unwrap_or(Intent::Question)
    }
}
