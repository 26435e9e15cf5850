use sha2::{Digest, Sha256};

use game_types::GameError;

/// Bearer-token check for the admin endpoints
#[derive(Clone)]
pub struct AdminAuth {
    token_digest: Option<[u8; 32]>,
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

impl AdminAuth {
    pub fn new(admin_token: Option<&str>) -> Self {
        Self {
            token_digest: admin_token
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(digest),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token_digest.is_some()
    }

    /// Validate an `Authorization` header value. Accepts `Bearer <token>`
    /// (scheme in any case) or a bare token.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<(), GameError> {
        let expected = self.token_digest.ok_or(GameError::AdminTokenNotConfigured)?;

        let header = authorization.map(str::trim).unwrap_or_default();
        let token = match header.split_once(char::is_whitespace) {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
            _ if header.eq_ignore_ascii_case("bearer") => "",
            _ => header,
        };
        if token.is_empty() {
            return Err(GameError::AdminTokenMissing);
        }

        // Constant-time over equal-length digests
        let provided = digest(token);
        let diff = expected
            .iter()
            .zip(provided.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        if diff == 0 {
            Ok(())
        } else {
            Err(GameError::Unauthorized)
        }
    }
}
