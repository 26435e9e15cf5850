use std::collections::HashSet;

use game_types::Answer;
use tracing::debug;

use crate::answer::short_answer_for_label;
use crate::normalize::{normalize, tokens};

// Exact tokens only, "manneskja" must not count as "man"
const GENDER_QUESTION_TERMS: &[&str] = &[
    "kona", "karl", "karlmadur", "kvenmadur", "karlkyn", "kvenkyn", "kk", "kvk", "male", "female",
    "woman", "boy", "girl", "hann", "hun", "stelpa", "drengur",
];
const GENDER_QUESTION_PHRASES: &[&str] = &["hvada kyn", "hvada kyni", "what gender", "is he", "is she"];

// English words that normalize onto Icelandic ones ("hér", "man") are left out
const GENDER_ANSWER_TERMS: &[&str] = &[
    "kona", "karl", "karlmadur", "kvenmadur", "karlkyns", "kvenkyns", "hann", "hun", "hans",
    "hennar", "stelpa", "strakur", "drengur", "woman", "male", "female", "he", "she", "his",
];

const LIFE_QUESTION_TERMS: &[&str] = &[
    "lifandi", "latin", "latinn", "lest", "dain", "dainn", "andadist", "alive", "dead", "died",
    "deceased", "living",
];
const LIFE_QUESTION_PHRASES: &[&str] = &["a lifi", "still alive", "fra lati", "passed away"];

const LIFE_ANSWER_TERMS: &[&str] = &[
    "lifandi", "lifir", "latin", "latinn", "lest", "dain", "dainn", "andadist", "alive", "dead",
    "died", "deceased", "living", "passed",
];

fn token_set(text: &str) -> HashSet<String> {
    tokens(text).into_iter().collect()
}

fn has_any(tokens: &HashSet<String>, terms: &[&str]) -> bool {
    terms.iter().any(|term| tokens.contains(*term))
}

pub fn is_gender_question(question: &str) -> bool {
    let q = normalize(question);
    has_any(&token_set(&q), GENDER_QUESTION_TERMS)
        || GENDER_QUESTION_PHRASES.iter().any(|phrase| q.contains(phrase))
}

pub fn is_life_status_question(question: &str) -> bool {
    let q = normalize(question);
    has_any(&token_set(&q), LIFE_QUESTION_TERMS)
        || LIFE_QUESTION_PHRASES.iter().any(|phrase| q.contains(phrase))
}

/// The model declined to talk about gender instead of answering
pub fn is_gender_refusal_answer(answer_text: &str) -> bool {
    let t = normalize(answer_text);
    t.contains("kyn") || t.contains("gender") || t.contains("he she")
}

fn discloses_gender(answer_text: &str) -> bool {
    let tokens = token_set(answer_text);
    // "-kona" compounds (tónlistarkona, leikkona) are gendered too
    has_any(&tokens, GENDER_ANSWER_TERMS) || tokens.iter().any(|t| t.len() > 4 && t.ends_with("kona"))
}

fn discloses_life_status(answer_text: &str) -> bool {
    has_any(&token_set(answer_text), LIFE_ANSWER_TERMS)
}

/// Strip gender and life-status details the player did not ask about.
/// The label survives, only the free text is reduced to the bare answer.
pub fn filter_disclosures(question: &str, answer: Answer) -> Answer {
    let leaks_gender = !is_gender_question(question) && discloses_gender(&answer.text);
    let leaks_life = !is_life_status_question(question) && discloses_life_status(&answer.text);

    if leaks_gender || leaks_life {
        debug!(
            leaks_gender,
            leaks_life, "Reducing answer text to label to avoid disclosure"
        );
        return Answer::new(answer.label, short_answer_for_label(answer.label));
    }
    answer
}
