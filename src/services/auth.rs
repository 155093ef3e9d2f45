//! Auth service
//!
//! The credential gateway: registration, login, token refresh, and
//! logout-as-blacklist. Tokens are opaque uuid values persisted with an
//! expiry and a revoked bit; an access token authenticates requests, the
//! refresh token mints new access tokens until it is blacklisted.

use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::db::repositories::{TokenRepository, UserRepository};
use crate::models::{AuthToken, RegisterInput, TokenKind, TokenPair, User};
use crate::services::password::{hash_password, verify_password};

/// Error types for auth operations
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Malformed input or bad credentials
    #[error("{0}")]
    Validation(String),

    /// Username already taken
    #[error("{0}")]
    Conflict(String),

    /// Malformed, unknown, expired, or already blacklisted token
    #[error("Invalid token")]
    InvalidToken,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Auth service for account and token lifecycle
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            access_ttl: Duration::minutes(config.access_token_minutes),
            refresh_ttl: Duration::days(config.refresh_token_days),
        }
    }

    /// Register a new user; the profile row is created in the same
    /// transaction by the repository.
    pub async fn register(&self, input: RegisterInput) -> Result<User, AuthServiceError> {
        let username = input.username.trim();
        let email = input.email.trim();
        if username.is_empty() {
            return Err(AuthServiceError::Validation("username is required".to_string()));
        }
        if email.is_empty() {
            return Err(AuthServiceError::Validation("email is required".to_string()));
        }
        if input.password.is_empty() {
            return Err(AuthServiceError::Validation("password is required".to_string()));
        }

        if self
            .users
            .get_by_username(username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(AuthServiceError::Conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(username.to_string(), email.to_string(), password_hash);

        let created = self
            .users
            .create_with_profile(&user)
            .await
            .context("Failed to create user")?;

        Ok(created)
    }

    /// Validate credentials and issue an access/refresh pair. The refresh
    /// token is also stored in the user's profile token slot.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenPair, AuthServiceError> {
        let user = self
            .users
            .get_by_username(username)
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| AuthServiceError::Validation("Invalid credentials".to_string()))?;

        let valid = verify_password(password, &user.password_hash)
            .context("Password verification failed")?;
        if !valid {
            return Err(AuthServiceError::Validation("Invalid credentials".to_string()));
        }

        let access = self.issue(user.id, TokenKind::Access);
        let refresh = self.issue(user.id, TokenKind::Refresh);
        self.tokens.insert(&access).await.context("Failed to store access token")?;
        self.tokens.insert(&refresh).await.context("Failed to store refresh token")?;

        self.users
            .set_profile_token(user.id, &refresh.token)
            .await
            .context("Failed to update profile token")?;

        Ok(TokenPair {
            access: access.token,
            refresh: refresh.token,
        })
    }

    /// Mint a new access token from a valid refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthServiceError> {
        let token = self.valid_token(refresh_token, TokenKind::Refresh).await?;

        let access = self.issue(token.user_id, TokenKind::Access);
        self.tokens.insert(&access).await.context("Failed to store access token")?;
        Ok(access.token)
    }

    /// Blacklist a refresh token. An unknown, malformed, expired, or
    /// already revoked token is an error; logout is not idempotent.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthServiceError> {
        self.valid_token(refresh_token, TokenKind::Refresh).await?;
        self.tokens
            .revoke(refresh_token)
            .await
            .context("Failed to revoke token")?;
        Ok(())
    }

    /// Resolve an access token to its user, if usable.
    pub async fn validate_access(&self, access_token: &str) -> Result<Option<User>, AuthServiceError> {
        let token = match self.tokens.get(access_token).await.context("Failed to look up token")? {
            Some(token) if token.kind == TokenKind::Access && token.is_valid(Utc::now()) => token,
            _ => return Ok(None),
        };

        let user = self
            .users
            .get_by_id(token.user_id)
            .await
            .context("Failed to look up user")?;
        Ok(user)
    }

    async fn valid_token(
        &self,
        value: &str,
        kind: TokenKind,
    ) -> Result<AuthToken, AuthServiceError> {
        match self.tokens.get(value).await.context("Failed to look up token")? {
            Some(token) if token.kind == kind && token.is_valid(Utc::now()) => Ok(token),
            _ => Err(AuthServiceError::InvalidToken),
        }
    }

    fn issue(&self, user_id: i64, kind: TokenKind) -> AuthToken {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        AuthToken {
            token: Uuid::new_v4().to_string(),
            user_id,
            kind,
            expires_at: now + ttl,
            revoked: false,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxTokenRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations::run_migrations};

    async fn setup() -> AuthService {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Migrations should apply");
        AuthService::new(
            Arc::new(SqlxUserRepository::new(pool.clone())),
            Arc::new(SqlxTokenRepository::new(pool)),
            &AuthConfig::default(),
        )
    }

    fn register_input(username: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "secret123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let service = setup().await;
        let user = service.register(register_input("alice")).await.unwrap();
        assert_eq!(user.username, "alice");

        let pair = service.login("alice", "secret123").await.unwrap();
        assert_ne!(pair.access, pair.refresh);

        let resolved = service.validate_access(&pair.access).await.unwrap();
        assert_eq!(resolved.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let service = setup().await;
        let mut input = register_input("alice");
        input.username = "  ".to_string();
        assert!(matches!(
            service.register(input).await,
            Err(AuthServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_username_conflicts() {
        let service = setup().await;
        service.register(register_input("alice")).await.unwrap();
        assert!(matches!(
            service.register(register_input("alice")).await,
            Err(AuthServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_login_bad_credentials() {
        let service = setup().await;
        service.register(register_input("alice")).await.unwrap();

        assert!(matches!(
            service.login("alice", "wrong").await,
            Err(AuthServiceError::Validation(_))
        ));
        assert!(matches!(
            service.login("nobody", "secret123").await,
            Err(AuthServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_issues_new_access_token() {
        let service = setup().await;
        service.register(register_input("alice")).await.unwrap();
        let pair = service.login("alice", "secret123").await.unwrap();

        let access = service.refresh(&pair.refresh).await.unwrap();
        assert_ne!(access, pair.access);
        assert!(service.validate_access(&access).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_logout_blacklists_refresh_token() {
        let service = setup().await;
        service.register(register_input("alice")).await.unwrap();
        let pair = service.login("alice", "secret123").await.unwrap();

        service.logout(&pair.refresh).await.unwrap();

        // Blacklisted: refresh and a second logout both fail
        assert!(matches!(
            service.refresh(&pair.refresh).await,
            Err(AuthServiceError::InvalidToken)
        ));
        assert!(matches!(
            service.logout(&pair.refresh).await,
            Err(AuthServiceError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_logout_rejects_garbage_and_access_tokens() {
        let service = setup().await;
        service.register(register_input("alice")).await.unwrap();
        let pair = service.login("alice", "secret123").await.unwrap();

        assert!(matches!(
            service.logout("not-a-token").await,
            Err(AuthServiceError::InvalidToken)
        ));
        // An access token is not a refresh token
        assert!(matches!(
            service.logout(&pair.access).await,
            Err(AuthServiceError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_validate_access_rejects_refresh_and_garbage() {
        let service = setup().await;
        service.register(register_input("alice")).await.unwrap();
        let pair = service.login("alice", "secret123").await.unwrap();

        assert!(service.validate_access(&pair.refresh).await.unwrap().is_none());
        assert!(service.validate_access("garbage").await.unwrap().is_none());
    }
}
