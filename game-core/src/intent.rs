use std::sync::LazyLock;

use game_types::Intent;
use regex::Regex;

use crate::normalize::{normalize, tokens};

const HINT_WORDS: &[&str] = &["visbending", "hint", "hjalp", "help", "clue"];
const HINT_PHRASES: &[&str] = &[
    "gefdu mer visbendingu",
    "ma eg fa visbendingu",
    "get eg fengid visbendingu",
    "give me a hint",
    "can i get a hint",
    "i need a hint",
];

// Leading words that make the input a yes/no or wh- question
const QUESTION_STARTERS: &[&str] = &[
    "er", "var", "ert", "eru", "voru", "hefur", "hafdi", "hafa", "getur", "gat", "mun", "myndi",
    "a", "atti", "hvad", "hver", "hvar", "hvenaer", "hvernig", "hvers", "hvort", "hvada", "hvi",
    "bjo", "byr", "lek", "leikur", "skrifadi", "starfar", "starfadi", "thekkist", "tengist",
    "faeddist", "kemur", "kom", "is", "was", "are", "were", "does", "did", "do", "has", "have",
    "had", "can", "could", "will", "would", "should", "who", "what", "where", "when", "why",
    "how", "which",
];

const MAX_GUESS_WORDS: usize = 4;
const LONG_QUESTION_WORDS: usize = 5;

static EXPLICIT_GUESS_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:gisk|giska|guess)\s*:|ég giska á\b|eg giska a\b|svarið er\b|svarid er\b|my guess is\b|i guess\b)\s*",
    )
    .expect("valid guess prefix pattern")
});

static SOFT_GUESS_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:þetta er|thetta er|it is|it's)\s+").expect("valid guess prefix pattern")
});

pub fn is_explicit_hint(input: &str) -> bool {
    let normalized = normalize(input);
    HINT_WORDS.contains(&normalized.as_str())
        || HINT_PHRASES.iter().any(|phrase| normalized.contains(phrase))
}

/// Remove a guess lead-in ("gisk:", "ég giska á", "þetta er", ...) and
/// return what is left, trimmed.
pub fn strip_guess_prefix(input: &str) -> String {
    let stripped = EXPLICIT_GUESS_PREFIX.replace(input, "");
    let stripped = SOFT_GUESS_PREFIX.replace(&stripped, "");
    stripped.trim().to_string()
}

fn looks_like_name(input: &str) -> bool {
    let words: Vec<&str> = input.split_whitespace().collect();
    !words.is_empty()
        && words.len() <= MAX_GUESS_WORDS
        && words.iter().all(|word| {
            word.chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() && c.is_uppercase())
        })
}

/// Rule-based intent detection. `None` means the rules could not decide and
/// the caller may ask a model or fall back to treating it as a question.
pub fn classify_heuristic(input: &str) -> Option<Intent> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if is_explicit_hint(trimmed) {
        return Some(Intent::Hint);
    }
    if EXPLICIT_GUESS_PREFIX.is_match(trimmed) {
        return Some(Intent::Guess);
    }
    if trimmed.ends_with('?') {
        return Some(Intent::Question);
    }
    if SOFT_GUESS_PREFIX.is_match(trimmed) {
        return Some(Intent::Guess);
    }

    let words = tokens(trimmed);
    if words
        .first()
        .is_some_and(|first| QUESTION_STARTERS.contains(&first.as_str()))
    {
        return Some(Intent::Question);
    }
    if words.len() > LONG_QUESTION_WORDS {
        return Some(Intent::Question);
    }
    if looks_like_name(trimmed) {
        return Some(Intent::Guess);
    }
    None
}
