use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// An authenticated session as reported by the backend auth service.
///
/// The value is passed explicitly to everything that needs it; there is no
/// process-wide "current user".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: String,
    /// `None` when the backend did not report an expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: Uuid, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            email: None,
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.trim().is_empty() && self.expires_at.map_or(true, |exp| exp > now)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Cache key for anything derived from this session.
    pub fn cache_key(&self) -> String {
        token_cache_key(&self.access_token)
    }
}

/// SHA-256 of the access token, hex encoded. Raw tokens never become keys.
pub fn token_cache_key(access_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(access_token.trim().as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: Option<i64>,
}

/// Expiry carried in the access token's `exp` claim.
///
/// The signature is not checked here; the auth service stays the authority on
/// whether a token is valid. Opaque or malformed tokens have no known expiry.
pub fn token_expiry(access_token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<TokenClaims>(
        access_token.trim(),
        &DecodingKey::from_secret(&[]),
        &validation,
    )
    .ok()?;
    DateTime::from_timestamp(data.claims.exp?, 0)
}

/// What the identity provider currently knows about the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    /// Lookup still in flight.
    Loading,
    SignedOut,
    SignedIn(Session),
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value
        .strip_prefix("Bearer ")
        .or_else(|| header_value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: i64,
    }

    #[test]
    fn expired_session_is_invalid() {
        let now = Utc::now();
        let session = Session::new(Uuid::new_v4(), "tok").expiring_at(now - Duration::seconds(1));
        assert!(!session.is_valid_at(now));
    }

    #[test]
    fn session_without_expiry_is_valid() {
        assert!(Session::new(Uuid::new_v4(), "tok").is_valid());
    }

    #[test]
    fn blank_token_is_invalid() {
        assert!(!Session::new(Uuid::new_v4(), "  ").is_valid());
    }

    #[test]
    fn cache_key_hides_token() {
        let session = Session::new(Uuid::new_v4(), "secret-token");
        let key = session.cache_key();
        assert_eq!(key.len(), 64);
        assert!(!key.contains("secret"));
        assert_eq!(key, token_cache_key("secret-token"));
        assert_ne!(key, token_cache_key("other-token"));
    }

    #[test]
    fn token_is_not_serialized() {
        let json = serde_json::to_string(&Session::new(Uuid::nil(), "secret-token")).unwrap();
        assert!(!json.contains("secret-token"));
    }

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }

    #[test]
    fn reads_expiry_from_token_claims() {
        let exp = Utc::now().timestamp() + 3600;
        let token = encode(
            &Header::default(),
            &Claims {
                sub: Uuid::new_v4().to_string(),
                exp,
            },
            &EncodingKey::from_secret(b"not-our-secret"),
        )
        .unwrap();

        assert_eq!(token_expiry(&token).map(|t| t.timestamp()), Some(exp));
    }

    #[test]
    fn opaque_token_has_no_expiry() {
        assert_eq!(token_expiry("tok"), None);
        assert_eq!(token_expiry("a.b.c"), None);
    }
}
