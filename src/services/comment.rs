//! Comment service
//!
//! Comments resolve their article from the request path, never from the
//! payload. New comments start flagged; only the hosting article's author
//! may toggle the flag, and the toggle is a pure negation of the stored
//! value.

use anyhow::Context;
use std::sync::Arc;

use crate::db::repositories::{ArticleRepository, CommentRepository};
use crate::models::{Comment, CreateCommentInput};
use crate::services::policy::{self, Actor, PolicyError};

/// Error types for comment operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Missing article or comment
    #[error("{0}")]
    NotFound(String),

    /// Malformed input, including a comment aimed at a missing article
    #[error("{0}")]
    Validation(String),

    /// Authenticated but not the article's author
    #[error("{0}")]
    Forbidden(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PolicyError> for CommentServiceError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Unauthorized => CommentServiceError::Unauthorized,
            PolicyError::Forbidden(msg) => CommentServiceError::Forbidden(msg),
        }
    }
}

/// Comment service
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    articles: Arc<dyn ArticleRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        articles: Arc<dyn ArticleRepository>,
    ) -> Self {
        Self { comments, articles }
    }

    /// Comment on the article named in the path. Any authenticated user may
    /// comment on any article, the actor's own included. A missing article
    /// is a validation failure, not a not-found.
    pub async fn create(
        &self,
        actor: &Actor,
        article_id: i64,
        input: CreateCommentInput,
    ) -> Result<Comment, CommentServiceError> {
        let user_id = policy::comment_author(actor)?;

        let content = match input.content.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => {
                return Err(CommentServiceError::Validation(
                    "content is required".to_string(),
                ))
            }
        };

        self.articles
            .get_by_id(article_id)
            .await
            .context("Failed to fetch article")?
            .ok_or_else(|| CommentServiceError::Validation("Article not found".to_string()))?;

        let comment = self
            .comments
            .create(article_id, user_id, content)
            .await
            .context("Failed to create comment")?;
        Ok(comment)
    }

    /// All comments on an article, oldest first. A missing article and an
    /// article with zero comments both yield not-found.
    pub async fn list(&self, article_id: i64) -> Result<Vec<Comment>, CommentServiceError> {
        self.articles
            .get_by_id(article_id)
            .await
            .context("Failed to fetch article")?
            .ok_or_else(|| CommentServiceError::NotFound("Article not found".to_string()))?;

        let comments = self
            .comments
            .list_by_article(article_id)
            .await
            .context("Failed to list comments")?;

        if comments.is_empty() {
            return Err(CommentServiceError::NotFound(
                "No comments found for this article".to_string(),
            ));
        }
        Ok(comments)
    }

    /// Negate a comment's flag. Only the article's author may do this; the
    /// comment must belong to the article named in the path.
    pub async fn toggle_flag(
        &self,
        actor: &Actor,
        article_id: i64,
        comment_id: i64,
    ) -> Result<Comment, CommentServiceError> {
        let article = self
            .articles
            .get_by_id(article_id)
            .await
            .context("Failed to fetch article")?
            .ok_or_else(|| CommentServiceError::NotFound("Article not found".to_string()))?;

        policy::can_toggle_flag(actor, article.author)?;

        let comment = self
            .comments
            .get_in_article(article_id, comment_id)
            .await
            .context("Failed to fetch comment")?
            .ok_or_else(|| {
                CommentServiceError::NotFound("Comment not found in this article".to_string())
            })?;

        self.comments
            .set_flagged(comment.id, !comment.flagged)
            .await
            .context("Failed to update comment flag")?;

        Ok(Comment {
            flagged: !comment.flagged,
            ..comment
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        ArticleRepository, SqlxArticleRepository, SqlxCommentRepository, SqlxUserRepository,
        UserRepository,
    };
    use crate::db::{create_test_pool, migrations::run_migrations};
    use crate::models::User;

    struct Fixture {
        service: CommentService,
        articles: Arc<SqlxArticleRepository>,
        users: SqlxUserRepository,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Migrations should apply");
        let articles = Arc::new(SqlxArticleRepository::new(pool.clone()));
        Fixture {
            service: CommentService::new(
                Arc::new(SqlxCommentRepository::new(pool.clone())),
                articles.clone(),
            ),
            articles,
            users: SqlxUserRepository::new(pool),
        }
    }

    async fn make_user(fx: &Fixture, name: &str) -> i64 {
        fx.users
            .create_with_profile(&User::new(
                name.to_string(),
                format!("{}@example.com", name),
                "hash".to_string(),
            ))
            .await
            .unwrap()
            .id
    }

    fn content(text: &str) -> CreateCommentInput {
        CreateCommentInput {
            content: Some(text.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_starts_flagged() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice").await;
        let bob = make_user(&fx, "bob").await;
        let article = fx.articles.create(alice, "T", "C", true, &[]).await.unwrap();

        let comment = fx
            .service
            .create(&Actor::User(bob), article.id, content("nice"))
            .await
            .unwrap();
        assert!(comment.flagged);
        assert_eq!(comment.user, bob);
        assert_eq!(comment.article, article.id);
    }

    #[tokio::test]
    async fn test_create_on_missing_article_is_validation_error() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice").await;

        assert!(matches!(
            fx.service.create(&Actor::User(alice), 999, content("hi")).await,
            Err(CommentServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_requires_auth_and_content() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice").await;
        let article = fx.articles.create(alice, "T", "C", true, &[]).await.unwrap();

        assert!(matches!(
            fx.service.create(&Actor::Anonymous, article.id, content("hi")).await,
            Err(CommentServiceError::Unauthorized)
        ));
        assert!(matches!(
            fx.service
                .create(&Actor::User(alice), article.id, content("  "))
                .await,
            Err(CommentServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_empty_and_missing_both_not_found() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice").await;
        let article = fx.articles.create(alice, "T", "C", true, &[]).await.unwrap();

        assert!(matches!(
            fx.service.list(article.id).await,
            Err(CommentServiceError::NotFound(_))
        ));
        assert!(matches!(
            fx.service.list(999).await,
            Err(CommentServiceError::NotFound(_))
        ));

        fx.service
            .create(&Actor::User(alice), article.id, content("hi"))
            .await
            .unwrap();
        assert_eq!(fx.service.list(article.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_flag_negates() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice").await;
        let bob = make_user(&fx, "bob").await;
        let article = fx.articles.create(alice, "T", "C", true, &[]).await.unwrap();
        let comment = fx
            .service
            .create(&Actor::User(bob), article.id, content("hi"))
            .await
            .unwrap();

        let toggled = fx
            .service
            .toggle_flag(&Actor::User(alice), article.id, comment.id)
            .await
            .unwrap();
        assert!(!toggled.flagged);

        let toggled = fx
            .service
            .toggle_flag(&Actor::User(alice), article.id, comment.id)
            .await
            .unwrap();
        assert!(toggled.flagged);
    }

    #[tokio::test]
    async fn test_toggle_flag_only_article_author() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice").await;
        let bob = make_user(&fx, "bob").await;
        let article = fx.articles.create(alice, "T", "C", true, &[]).await.unwrap();
        let comment = fx
            .service
            .create(&Actor::User(bob), article.id, content("hi"))
            .await
            .unwrap();

        // The comment's own author gets no special treatment
        assert!(matches!(
            fx.service.toggle_flag(&Actor::User(bob), article.id, comment.id).await,
            Err(CommentServiceError::Forbidden(_))
        ));
        assert!(matches!(
            fx.service
                .toggle_flag(&Actor::Anonymous, article.id, comment.id)
                .await,
            Err(CommentServiceError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_toggle_flag_requires_comment_in_article() {
        let fx = setup().await;
        let alice = make_user(&fx, "alice").await;
        let bob = make_user(&fx, "bob").await;
        let first = fx.articles.create(alice, "A", "x", true, &[]).await.unwrap();
        let second = fx.articles.create(alice, "B", "x", true, &[]).await.unwrap();
        let comment = fx
            .service
            .create(&Actor::User(bob), first.id, content("hi"))
            .await
            .unwrap();

        assert!(matches!(
            fx.service
                .toggle_flag(&Actor::User(alice), second.id, comment.id)
                .await,
            Err(CommentServiceError::NotFound(_))
        ));
        assert!(matches!(
            fx.service.toggle_flag(&Actor::User(alice), 999, comment.id).await,
            Err(CommentServiceError::NotFound(_))
        ));
    }
}
