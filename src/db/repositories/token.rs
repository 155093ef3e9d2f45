//! Auth token repository
//!
//! Stores opaque access/refresh tokens. Logout is a blacklist operation:
//! the row stays, its `revoked` bit flips.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::models::{AuthToken, TokenKind};

/// Token repository trait
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Persist a freshly issued token
    async fn insert(&self, token: &AuthToken) -> Result<()>;

    /// Fetch a token by value
    async fn get(&self, token: &str) -> Result<Option<AuthToken>>;

    /// Blacklist a token; returns false when it does not exist
    async fn revoke(&self, token: &str) -> Result<bool>;
}

/// sqlx-backed token repository
pub struct SqlxTokenRepository {
    pool: SqlitePool,
}

impl SqlxTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for SqlxTokenRepository {
    async fn insert(&self, token: &AuthToken) -> Result<()> {
        sqlx::query(
            "INSERT INTO auth_tokens (token, user_id, kind, expires_at, revoked, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.kind.to_string())
        .bind(token.expires_at)
        .bind(token.revoked)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<AuthToken>> {
        let row = sqlx::query("SELECT * FROM auth_tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| {
            Ok(AuthToken {
                token: r.get("token"),
                user_id: r.get("user_id"),
                kind: r.get::<String, _>("kind").parse::<TokenKind>()?,
                expires_at: r.get("expires_at"),
                revoked: r.get("revoked"),
                created_at: r.get("created_at"),
            })
        })
        .transpose()
    }

    async fn revoke(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE auth_tokens SET revoked = 1 WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
