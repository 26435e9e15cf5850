use game_types::{Answer, AnswerLabel, Person};

use crate::normalize::normalize;

const NAME_REFUSAL: &str = "Ég get ekki staðfest nafn beint. Prófaðu frekar eiginleika eða hlutverk.";
const UNSURE: &str = "Ég er ekki viss, geturðu spurt aðeins skýrar?";
const TOO_SHORT: &str = "Geturðu orðað þetta aðeins nánar?";

/// Questions shorter than this (normalized) are asked to be rephrased
const MIN_QUESTION_LEN: usize = 8;

/// Keyword-overlap answer used when no language model is available
pub fn answer_question_for_person(question: &str, person: &Person) -> Answer {
    let q = normalize(question);

    let mentions_name = person
        .accepted_names()
        .map(normalize)
        .filter(|name| !name.is_empty())
        .any(|name| q.contains(&name));

    if mentions_name {
        return Answer::new(AnswerLabel::Unknown, NAME_REFUSAL);
    }
    if matches_any(&q, &person.yes_keywords) {
        return Answer::new(AnswerLabel::Yes, "Já, það passar.");
    }
    if matches_any(&q, &person.no_keywords) {
        return Answer::new(AnswerLabel::No, "Nei, það passar ekki.");
    }
    if q.chars().count() < MIN_QUESTION_LEN {
        return Answer::new(AnswerLabel::Unknown, TOO_SHORT);
    }
    Answer::new(AnswerLabel::Unknown, UNSURE)
}

fn matches_any(question: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .map(|keyword| normalize(keyword))
        .filter(|keyword| !keyword.is_empty())
        .any(|keyword| question.contains(&keyword))
}

/// One-or-two word answer text for a label
pub fn short_answer_for_label(label: AnswerLabel) -> &'static str {
    match label {
        AnswerLabel::Yes => "Já.",
        AnswerLabel::No => "Nei.",
        AnswerLabel::ProbablyYes => "Líklega já.",
        AnswerLabel::ProbablyNo => "Líklega nei.",
        AnswerLabel::Unknown => "Ekki viss.",
    }
}
