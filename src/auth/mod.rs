use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod password;

pub use password::{hash_password, verify_password};

/// Bearer token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            email: email.into(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error("Token lifetime must be between 1 and {max} hours, got {0}", max = MAX_TOKEN_TTL_HOURS)]
    InvalidExpiry(u64),

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hashing failed")]
    PasswordHash,

    #[error("Hashing task failed: {0}")]
    Join(String),
}

/// Longest token lifetime accepted: one year.
pub const MAX_TOKEN_TTL_HOURS: u64 = 8760;

/// Signs and verifies HS256 tokens with the server-held secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&expiry_hours) {
            return Err(AuthError::InvalidExpiry(expiry_hours));
        }
        let hours = i64::try_from(expiry_hours).map_err(|_| AuthError::InvalidExpiry(expiry_hours))?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expired means expired: no grace window.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(hours),
        })
    }

    pub fn issue(&self, user_id: &str, email: &str) -> Result<String, AuthError> {
        self.encode(&Claims::new(user_id, email, self.ttl))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Decoded claims, or `None` for any bad signature, shape or expiry.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("Token rejected: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> TokenService {
        TokenService::new("test-secret", 24).unwrap()
    }

    #[test]
    fn issued_token_verifies_with_same_identity() {
        let service = tokens();
        let token = service.issue("u-1", "a@x.com").unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.user_id, "u-1");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn payload_uses_camel_case_user_id() {
        let claims = Claims::new("u-1", "a@x.com", Duration::hours(1));
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], "u-1");
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = tokens();
        let claims = Claims::new("u-1", "a@x.com", Duration::seconds(-10));
        let token = service.encode(&claims).unwrap();
        assert!(service.verify(&token).is_none());
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let other = TokenService::new("other-secret", 24).unwrap();
        let token = other.issue("u-1", "a@x.com").unwrap();
        assert!(tokens().verify(&token).is_none());
        assert!(tokens().verify("not.a.token").is_none());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(TokenService::new("", 24), Err(AuthError::MissingSecret)));
    }

    #[test]
    fn lifetime_outside_bounds_is_refused() {
        assert!(matches!(TokenService::new("s", 0), Err(AuthError::InvalidExpiry(0))));
        assert!(matches!(
            TokenService::new("s", u64::MAX),
            Err(AuthError::InvalidExpiry(u64::MAX))
        ));

        let service = TokenService::new("s", MAX_TOKEN_TTL_HOURS).unwrap();
        let claims = service.verify(&service.issue("u-1", "a@x.com").unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_TTL_HOURS as i64 * 3600);
    }
}
