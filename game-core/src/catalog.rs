use game_types::Person;

use crate::round::round_hash;

/// The persons rounds are assigned from when no explicit assignment exists
#[derive(Debug, Clone)]
pub struct PersonCatalog {
    persons: Vec<Person>,
}

impl PersonCatalog {
    /// Returns `None` for an empty list, a catalog must always yield a person
    pub fn new(persons: Vec<Person>) -> Option<Self> {
        if persons.is_empty() {
            None
        } else {
            Some(Self { persons })
        }
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn find(&self, person_id: &str) -> Option<&Person> {
        self.persons.iter().find(|person| person.id == person_id)
    }

    /// Deterministic `hash(round_id) mod len` assignment
    pub fn assigned_for(&self, round_id: &str) -> &Person {
        let index = round_hash(round_id) as usize % self.persons.len();
        &self.persons[index]
    }
}

impl Default for PersonCatalog {
    fn default() -> Self {
        Self {
            persons: default_persons(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Seed persons shipped with the game
pub fn default_persons() -> Vec<Person> {
    vec![
        Person {
            id: "p-egill".to_string(),
            display_name: "Egill Skallagrímsson".to_string(),
            reveal_text: "Skáld og víkingur úr Íslendingasögunum.".to_string(),
            image_url: "https://upload.wikimedia.org/wikipedia/commons/8/84/Egilssaga17.jpg"
                .to_string(),
            aliases: strings(&["egill", "egill skallagrimsson", "skallagrimsson"]),
            hint: "Persónan tengist fornsögum Íslands og er þekkt fyrir ljóð.".to_string(),
            yes_keywords: strings(&["saga", "forn", "skáld", "karl", "islendingasaga", "miðaldir"]),
            no_keywords: strings(&["kona", "tónlist", "fótbolti", "leikari"]),
            is_icelander: true,
        },
        Person {
            id: "p-bjork".to_string(),
            display_name: "Björk Guðmundsdóttir".to_string(),
            reveal_text: "Íslensk tónlistarkona og alþjóðleg listakona.".to_string(),
            image_url:
                "https://upload.wikimedia.org/wikipedia/commons/7/74/Bj%C3%B6rk_at_S%C3%B3leyjargata.jpg"
                    .to_string(),
            aliases: strings(&["bjork", "björk", "bjork gudmundsdottir", "björk guðmundsdóttir"]),
            hint: "Persónan er þekkt fyrir mjög sérstakan söngstíl.".to_string(),
            yes_keywords: strings(&["kona", "söng", "tónlist", "list", "pop", "album"]),
            no_keywords: strings(&["fótbolti", "forseti", "vísind"]),
            is_icelander: true,
        },
        Person {
            id: "p-vigdis".to_string(),
            display_name: "Vigdís Finnbogadóttir".to_string(),
            reveal_text: "Fyrrverandi forseti Íslands og mikilvæg táknmynd.".to_string(),
            image_url:
                "https://upload.wikimedia.org/wikipedia/commons/f/f6/Vigdis_Finnbogadottir_1985.jpg"
                    .to_string(),
            aliases: strings(&["vigdis", "vigdís", "vigdís finnbogadóttir", "vigdis finnbogadottir"]),
            hint: "Persónan tengist embætti þjóðhöfðingja.".to_string(),
            yes_keywords: strings(&["kona", "forseti", "stjórnmál", "island", "embætti"]),
            no_keywords: strings(&["fótbolti", "rap", "leikari"]),
            is_icelander: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(PersonCatalog::new(Vec::new()).is_none());
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let catalog = PersonCatalog::default();
        assert_eq!(catalog.assigned_for("2024-05-01").id, "p-bjork");
        assert_eq!(catalog.assigned_for("2024-05-03").id, "p-egill");
        assert_eq!(
            catalog.assigned_for("2030-01-01").id,
            catalog.assigned_for("2030-01-01").id
        );
    }

    #[test]
    fn test_find_by_id() {
        let catalog = PersonCatalog::default();
        assert_eq!(
            catalog.find("p-vigdis").map(|p| p.display_name.as_str()),
            Some("Vigdís Finnbogadóttir")
        );
        assert!(catalog.find("p-nobody").is_none());
    }
}
