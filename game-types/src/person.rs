use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::PersonId;

/// The hidden person of a round. Never sent to players in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Person {
    pub id: PersonId,
    pub display_name: String,
    pub reveal_text: String,
    pub image_url: String,
    pub aliases: Vec<String>,
    pub hint: String,
    pub yes_keywords: Vec<String>,
    pub no_keywords: Vec<String>,
    pub is_icelander: bool,
}

impl Person {
    /// Display name followed by every alias, the set a guess is checked against
    pub fn accepted_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.display_name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// What a player is allowed to see once the round is solved or closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RevealPerson {
    pub display_name: String,
    pub reveal_text: String,
    pub image_url: String,
}

impl From<&Person> for RevealPerson {
    fn from(person: &Person) -> Self {
        RevealPerson {
            display_name: person.display_name.clone(),
            reveal_text: person.reveal_text.clone(),
            image_url: person.image_url.clone(),
        }
    }
}
