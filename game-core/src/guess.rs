use game_types::Person;

use crate::normalize::normalize;

/// A guess is correct when, once normalized, it equals or contains the
/// display name or one of the aliases.
pub fn is_correct_guess(guess: &str, person: &Person) -> bool {
    let guess = normalize(guess);
    if guess.is_empty() {
        return false;
    }

    person
        .accepted_names()
        .map(normalize)
        .filter(|candidate| !candidate.is_empty())
        .any(|candidate| guess == candidate || guess.contains(&candidate))
}
