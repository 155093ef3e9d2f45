//! Comment repository

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::models::Comment;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a comment; flagged defaults to true, created_at is set once
    async fn create(&self, article_id: i64, user_id: i64, content: &str) -> Result<Comment>;

    /// All comments on an article, oldest first
    async fn list_by_article(&self, article_id: i64) -> Result<Vec<Comment>>;

    /// Look up a comment that belongs to the given article
    async fn get_in_article(&self, article_id: i64, comment_id: i64) -> Result<Option<Comment>>;

    /// Overwrite the flagged bit
    async fn set_flagged(&self, id: i64, flagged: bool) -> Result<bool>;
}

/// sqlx-backed comment repository
pub struct SqlxCommentRepository {
    pool: SqlitePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        article: row.get("article_id"),
        user: row.get("user_id"),
        content: row.get("content"),
        flagged: row.get("flagged"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, article_id: i64, user_id: i64, content: &str) -> Result<Comment> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO comments (article_id, user_id, content, flagged, created_at) \
             VALUES (?, ?, ?, 1, ?)",
        )
        .bind(article_id)
        .bind(user_id)
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            article: article_id,
            user: user_id,
            content: content.to_string(),
            flagged: true,
            created_at: now,
        })
    }

    async fn list_by_article(&self, article_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT * FROM comments WHERE article_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_comment).collect())
    }

    async fn get_in_article(&self, article_id: i64, comment_id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = ? AND article_id = ?")
            .bind(comment_id)
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| row_to_comment(&r)))
    }

    async fn set_flagged(&self, id: i64, flagged: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE comments SET flagged = ? WHERE id = ?")
            .bind(flagged)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{ArticleRepository, SqlxArticleRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations::run_migrations};
    use crate::models::User;

    struct Fixture {
        comments: SqlxCommentRepository,
        articles: SqlxArticleRepository,
        users: SqlxUserRepository,
    }

    async fn setup() -> (Fixture, i64, i64) {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Migrations should apply");
        let fx = Fixture {
            comments: SqlxCommentRepository::new(pool.clone()),
            articles: SqlxArticleRepository::new(pool.clone()),
            users: SqlxUserRepository::new(pool),
        };
        let user = fx
            .users
            .create_with_profile(&User::new(
                "alice".to_string(),
                "alice@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();
        let article = fx.articles.create(user.id, "T", "C", true, &[]).await.unwrap();
        (fx, user.id, article.id)
    }

    #[tokio::test]
    async fn test_create_defaults_flagged_true() {
        let (fx, user, article) = setup().await;
        let comment = fx.comments.create(article, user, "hi").await.unwrap();

        assert!(comment.flagged);
        assert_eq!(comment.article, article);
        assert_eq!(comment.user, user);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_article() {
        let (fx, user, _) = setup().await;
        assert!(fx.comments.create(999, user, "hi").await.is_err());
    }

    #[tokio::test]
    async fn test_list_by_article_in_creation_order() {
        let (fx, user, article) = setup().await;
        let first = fx.comments.create(article, user, "one").await.unwrap();
        let second = fx.comments.create(article, user, "two").await.unwrap();

        let listed = fx.comments.list_by_article(article).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_get_in_article_enforces_binding() {
        let (fx, user, article) = setup().await;
        let other_article = fx.articles.create(user, "T2", "C2", true, &[]).await.unwrap();
        let comment = fx.comments.create(article, user, "hi").await.unwrap();

        assert!(fx.comments.get_in_article(article, comment.id).await.unwrap().is_some());
        assert!(fx
            .comments
            .get_in_article(other_article.id, comment.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_set_flagged() {
        let (fx, user, article) = setup().await;
        let comment = fx.comments.create(article, user, "hi").await.unwrap();

        assert!(fx.comments.set_flagged(comment.id, false).await.unwrap());
        let got = fx.comments.get_in_article(article, comment.id).await.unwrap().unwrap();
        assert!(!got.flagged);

        assert!(!fx.comments.set_flagged(999, true).await.unwrap());
    }

    #[tokio::test]
    async fn test_article_delete_cascades_to_comments() {
        let (fx, user, article) = setup().await;
        let comment = fx.comments.create(article, user, "hi").await.unwrap();

        fx.articles.delete(article).await.unwrap();
        assert!(fx.comments.get_in_article(article, comment.id).await.unwrap().is_none());
    }
}
