use unicode_normalization::UnicodeNormalization;

/// Fold free text into the comparable form used by guesses and keyword matching.
///
/// Lowercases, strips combining accents, transliterates the Icelandic letters
/// that do not decompose (ð, þ, æ) and reduces everything outside
/// `[a-z0-9 -]` to single spaces.
pub fn normalize(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let mut folded = String::with_capacity(lowered.len());

    for ch in lowered.nfd() {
        if ('\u{0300}'..='\u{036f}').contains(&ch) {
            continue;
        }
        match ch {
            'ð' => folded.push('d'),
            'þ' => folded.push_str("th"),
            'æ' => folded.push_str("ae"),
            'ø' => folded.push('o'),
            'ß' => folded.push_str("ss"),
            'a'..='z' | '0'..='9' | '-' => folded.push(ch),
            _ => folded.push(' '),
        }
    }

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tokens of the normalized text
pub fn tokens(input: &str) -> Vec<String> {
    normalize(input)
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Usernames keep their letters but must compare equal across
/// visually identical code points and case.
pub fn normalize_username(username: &str) -> String {
    username.trim().nfkc().collect::<String>().to_lowercase()
}

/// URL-safe slug: normalized words joined by single dashes
pub fn slugify(input: &str) -> String {
    normalize(input)
        .split(|c: char| c == ' ' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Maximum entries kept from an admin-supplied comma separated list
pub const MAX_CSV_ENTRIES: usize = 25;

/// Split a comma separated admin field, dropping blanks
pub fn split_csv(input: Option<&str>) -> Vec<String> {
    input
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .take(MAX_CSV_ENTRIES)
        .map(str::to_string)
        .collect()
}
