//! Access token issuing and verification (HS256).

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;

/// Payload stored in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account email.
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Failed to sign token")]
    Signing,
}

#[derive(Clone)]
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl JwtManager {
    #[must_use]
    pub fn new(secret: &str, lifetime_minutes: u64) -> Self {
        let lifetime_secs = i64::try_from(lifetime_minutes.saturating_mul(60)).unwrap_or(i64::MAX);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(&config.secret_key, config.access_token_expire_minutes)
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        self.issue_with_times(subject, now, now.saturating_add(self.lifetime_secs))
    }

    fn issue_with_times(&self, subject: &str, iat: i64, exp: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|_| TokenError::Signing)
    }

    /// Checks signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        use jsonwebtoken::errors::ErrorKind;

        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issue_and_verify() {
        let jwt = JwtManager::new(SECRET, 30);
        let token = jwt.issue("user@example.com").unwrap();
        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = JwtManager::new(SECRET, 30);
        let past = Utc::now().timestamp() - 3600;
        let token = jwt.issue_with_times("user@example.com", past - 60, past).unwrap();
        assert_eq!(jwt.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtManager::new(SECRET, 30);
        let other = JwtManager::new("ffffffffffffffffffffffffffffffff", 30);
        let token = issuer.issue("user@example.com").unwrap();
        assert_eq!(other.verify(&token).unwrap_err(), TokenError::Invalid);
        assert_eq!(issuer.verify("not.a.token").unwrap_err(), TokenError::Invalid);
    }
}
