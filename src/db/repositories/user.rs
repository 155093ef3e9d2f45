//! User repository
//!
//! Users and their one-to-one profiles are created in a single transaction
//! so a failed profile insert never leaves an orphan account.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::models::{Profile, User};

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user together with its profile
    async fn create_with_profile(&self, user: &User) -> Result<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get a user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get a user's profile
    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>>;

    /// Store an opaque token in the user's profile slot
    async fn set_profile_token(&self, user_id: i64, token: &str) -> Result<()>;

    /// Delete a user (cascades to articles, comments, profile, tokens)
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// sqlx-backed user repository
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_with_profile(&self, user: &User) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();

        sqlx::query("INSERT INTO profiles (user_id) VALUES (?)")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: user.created_at,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Profile {
            id: r.get("id"),
            user_id: r.get("user_id"),
            token: r.get("token"),
        }))
    }

    async fn set_profile_token(&self, user_id: i64, token: &str) -> Result<()> {
        sqlx::query("UPDATE profiles SET token = ? WHERE user_id = ?")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations::run_migrations};

    async fn setup() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Migrations should apply");
        SqlxUserRepository::new(pool)
    }

    fn sample_user(username: &str) -> User {
        User::new(
            username.to_string(),
            format!("{}@example.com", username),
            "hash".to_string(),
        )
    }

    #[tokio::test]
    async fn test_create_creates_profile_too() {
        let repo = setup().await;
        let user = repo
            .create_with_profile(&sample_user("alice"))
            .await
            .expect("create should succeed");

        assert!(user.id > 0);
        let profile = repo
            .get_profile(user.id)
            .await
            .expect("query should succeed")
            .expect("profile should exist");
        assert_eq!(profile.user_id, user.id);
        assert!(profile.token.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = setup().await;
        repo.create_with_profile(&sample_user("alice")).await.unwrap();
        assert!(repo.create_with_profile(&sample_user("alice")).await.is_err());
    }

    #[tokio::test]
    async fn test_get_by_username() {
        let repo = setup().await;
        repo.create_with_profile(&sample_user("bob")).await.unwrap();

        let found = repo.get_by_username("bob").await.unwrap();
        assert!(found.is_some());
        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_profile_token() {
        let repo = setup().await;
        let user = repo.create_with_profile(&sample_user("carol")).await.unwrap();

        repo.set_profile_token(user.id, "opaque-token").await.unwrap();
        let profile = repo.get_profile(user.id).await.unwrap().unwrap();
        assert_eq!(profile.token.as_deref(), Some("opaque-token"));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_profile() {
        let repo = setup().await;
        let user = repo.create_with_profile(&sample_user("dave")).await.unwrap();

        assert!(repo.delete(user.id).await.unwrap());
        assert!(repo.get_profile(user.id).await.unwrap().is_none());
        assert!(!repo.delete(user.id).await.unwrap());
    }
}
