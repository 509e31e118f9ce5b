//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::{Store, User};
use crate::domain::UserId;
use crate::services::auth_service::{AuthError, AuthService, AuthUser};
use crate::services::token::JwtManager;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: JwtManager,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens: JwtManager::from_config(&security),
            security,
        }
    }
}

/// One `@` with a non-empty local part and a dotted domain.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = email.trim();
        if !looks_like_email(email) {
            return Err(AuthError::Validation(format!("Invalid email address: {email}")));
        }

        if full_name.trim().is_empty() {
            return Err(AuthError::Validation("Full name cannot be empty".to_string()));
        }

        if password.chars().count() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }

        let user = self
            .store
            .create_user(email, full_name.trim(), password, &self.security)
            .await?
            .ok_or(AuthError::EmailTaken)?;

        info!(user_id = user.id.value(), "Registered new user");
        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .store
            .verify_user_password(email.trim(), password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.tokens
            .issue(&user.email)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.tokens.verify(token).map_err(|e| {
            warn!("Rejected bearer token: {e}");
            AuthError::Unauthorized
        })?;

        let user = self
            .store
            .get_user_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }

    async fn profile(&self, id: UserId) -> Result<User, AuthError> {
        self.store.get_user(id).await?.ok_or(AuthError::Unauthorized)
    }

    async fn delete_account(&self, id: UserId) -> Result<(), AuthError> {
        if !self.store.delete_user(id).await? {
            return Err(AuthError::Unauthorized);
        }
        info!(user_id = id.value(), "Deleted user account");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("demo@example.com"));
        assert!(looks_like_email("a.b+c@sub.example.org"));
        assert!(!looks_like_email("demo.example.com"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("demo@localhost"));
        assert!(!looks_like_email("demo@@example.com"));
        assert!(!looks_like_email("de mo@example.com"));
        assert!(!looks_like_email("demo@example."));
    }
}
