use std::sync::LazyLock;

use regex::Regex;

use game_core::RoundKey;
use game_types::{AssignRoundRequest, CreatePersonRequest, GameError};

pub const DEFAULT_SUBMISSION_LIMIT: u64 = 100;
pub const MAX_SUBMISSION_LIMIT: u64 = 500;

static ROUND_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid round id pattern"));

/// Trim and check the length in characters
fn bounded(field: &str, value: &str, min: usize, max: usize) -> Result<String, GameError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min {
        return Err(GameError::invalid(format!(
            "{} must be at least {} characters",
            field, min
        )));
    }
    if len > max {
        return Err(GameError::invalid(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(trimmed.to_string())
}

fn optional_bounded(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>, GameError> {
    value.map(|v| bounded(field, v, 0, max)).transpose()
}

pub fn session_id(value: &str) -> Result<String, GameError> {
    bounded("session_id", value, 1, 120)
}

pub fn question(value: &str) -> Result<String, GameError> {
    bounded("question", value, 2, 400)
}

pub fn guess(value: &str) -> Result<String, GameError> {
    bounded("guess", value, 1, 200)
}

/// Free-text input shares the question bounds minus the two-character floor
pub fn input_text(value: &str) -> Result<String, GameError> {
    bounded("input", value, 1, 400)
}

/// Blank device ids count as absent
pub fn device_id(value: Option<&str>) -> Result<Option<String>, GameError> {
    Ok(optional_bounded("device_id", value, 200)?.filter(|id| !id.is_empty()))
}

pub fn required_device_id(value: &str) -> Result<String, GameError> {
    bounded("device_id", value, 1, 200)
}

pub fn username(value: &str) -> Result<String, GameError> {
    bounded("username", value, 2, 32)
}

pub fn round_id(value: &str) -> Result<RoundKey, GameError> {
    let value = value.trim();
    if !ROUND_ID_PATTERN.is_match(value) {
        return Err(GameError::invalid("round_id must look like YYYY-MM-DD"));
    }
    value.parse()
}

pub fn submission_limit(value: Option<u64>) -> Result<u64, GameError> {
    match value {
        None => Ok(DEFAULT_SUBMISSION_LIMIT),
        Some(limit) if (1..=MAX_SUBMISSION_LIMIT).contains(&limit) => Ok(limit),
        Some(_) => Err(GameError::invalid(format!(
            "limit must be between 1 and {}",
            MAX_SUBMISSION_LIMIT
        ))),
    }
}

fn image_url(value: &str) -> Result<String, GameError> {
    let url = bounded("image_url", value, 1, 500)?;
    let parsed = reqwest::Url::parse(&url)
        .map_err(|_| GameError::invalid("image_url must be a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(GameError::invalid("image_url must be an http(s) URL"));
    }
    Ok(url)
}

/// Normalised copy of an admin create-person request
pub fn create_person(request: CreatePersonRequest) -> Result<CreatePersonRequest, GameError> {
    Ok(CreatePersonRequest {
        display_name: bounded("display_name", &request.display_name, 2, 120)?,
        reveal_text: bounded("reveal_text", &request.reveal_text, 2, 400)?,
        image_url: image_url(&request.image_url)?,
        hint: optional_bounded("hint", request.hint.as_deref(), 300)?,
        aliases_csv: optional_bounded("aliases_csv", request.aliases_csv.as_deref(), 500)?,
        yes_keywords_csv: optional_bounded(
            "yes_keywords_csv",
            request.yes_keywords_csv.as_deref(),
            500,
        )?,
        no_keywords_csv: optional_bounded(
            "no_keywords_csv",
            request.no_keywords_csv.as_deref(),
            500,
        )?,
        is_icelander: request.is_icelander,
    })
}

pub fn assign_round(request: AssignRoundRequest) -> Result<AssignRoundRequest, GameError> {
    Ok(AssignRoundRequest {
        person_id: bounded("person_id", &request.person_id, 1, 120)?,
        hint_text: optional_bounded("hint_text", request.hint_text.as_deref(), 300)?,
        status_override: request.status_override,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_request() -> CreatePersonRequest {
        CreatePersonRequest {
            display_name: " Jón Páll ".to_string(),
            reveal_text: "Kraftlyftingamaður.".to_string(),
            image_url: "https://example.com/jon.jpg".to_string(),
            hint: None,
            aliases_csv: Some("jon pall".to_string()),
            yes_keywords_csv: None,
            no_keywords_csv: None,
            is_icelander: true,
        }
    }

    #[test]
    fn test_text_bounds() {
        assert_eq!(question("  Er hún kona? ").unwrap(), "Er hún kona?");
        assert!(question("a").is_err());
        assert!(question(&"x".repeat(401)).is_err());
        assert!(guess(" ").is_err());
        assert!(session_id("").is_err());
        assert!(username("Þ").is_err());
        // counts characters, not bytes
        assert!(username(&"þ".repeat(32)).is_ok());
    }

    #[test]
    fn test_device_id() {
        assert_eq!(device_id(None).unwrap(), None);
        assert_eq!(device_id(Some("  ")).unwrap(), None);
        assert_eq!(device_id(Some(" abc ")).unwrap().as_deref(), Some("abc"));
        assert!(device_id(Some(&"d".repeat(201))).is_err());
    }

    #[test]
    fn test_round_id() {
        assert_eq!(round_id("2024-05-01").unwrap().to_string(), "2024-05-01");
        assert!(round_id("2024-5-1").is_err());
        assert!(round_id("2024-02-30").is_err());
        assert!(round_id("tomorrow").is_err());
    }

    #[test]
    fn test_submission_limit() {
        assert_eq!(submission_limit(None).unwrap(), DEFAULT_SUBMISSION_LIMIT);
        assert_eq!(submission_limit(Some(10)).unwrap(), 10);
        assert!(submission_limit(Some(0)).is_err());
        assert!(submission_limit(Some(MAX_SUBMISSION_LIMIT + 1)).is_err());
    }

    #[test]
    fn test_create_person() {
        let valid = create_person(person_request()).unwrap();
        assert_eq!(valid.display_name, "Jón Páll");

        let mut bad_url = person_request();
        bad_url.image_url = "ftp://example.com/a.jpg".to_string();
        assert!(create_person(bad_url).is_err());

        let mut short_name = person_request();
        short_name.display_name = "J".to_string();
        assert!(create_person(short_name).is_err());
    }
}
