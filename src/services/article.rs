//! Article service
//!
//! Applies the access policy to article CRUD. Every owner-facing operation
//! resolves its target through an owned scope, so an article belonging to
//! someone else is indistinguishable from one that does not exist.

use anyhow::Context;
use std::sync::Arc;

use crate::db::repositories::{ArticleRepository, CategoryRepository};
use crate::models::{Article, CreateArticleInput, UpdateArticleInput};
use crate::services::policy::{self, Actor, CategoryFilter, PolicyError};

/// Error types for article operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    /// Missing, or outside the actor's visible scope
    #[error("{0}")]
    NotFound(String),

    /// Malformed input
    #[error("{0}")]
    Validation(String),

    /// Authenticated but not permitted
    #[error("{0}")]
    Forbidden(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PolicyError> for ArticleServiceError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Unauthorized => ArticleServiceError::Unauthorized,
            PolicyError::Forbidden(msg) => ArticleServiceError::Forbidden(msg),
        }
    }
}

/// Article service
pub struct ArticleService {
    articles: Arc<dyn ArticleRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl ArticleService {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self { articles, categories }
    }

    /// Every article, drafts included, optionally narrowed by category ids.
    pub async fn list_public(
        &self,
        filter: CategoryFilter,
    ) -> Result<Vec<Article>, ArticleServiceError> {
        let scope = policy::public_scope(filter);
        let articles = self
            .articles
            .list(&scope)
            .await
            .context("Failed to list articles")?;
        Ok(articles)
    }

    /// The actor's own articles, optionally narrowed by category ids.
    pub async fn list_owned(
        &self,
        actor: &Actor,
        filter: CategoryFilter,
    ) -> Result<Vec<Article>, ArticleServiceError> {
        let scope = policy::owned_scope(actor, filter)?;
        let articles = self
            .articles
            .list(&scope)
            .await
            .context("Failed to list articles")?;
        Ok(articles)
    }

    /// Published articles in the named category. A missing category and an
    /// empty category both come back as an empty list.
    pub async fn list_by_category_name(
        &self,
        name: &str,
    ) -> Result<Vec<Article>, ArticleServiceError> {
        let scope = policy::category_scope(name);
        let articles = self
            .articles
            .list(&scope)
            .await
            .context("Failed to list articles")?;
        Ok(articles)
    }

    /// Create an article. The author is forced to the actor; a payload
    /// author is already discarded at deserialization.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        let author_id = policy::creation_author(actor)?;

        let title = required_field(input.title.as_deref(), "title")?;
        let content = required_field(input.content.as_deref(), "content")?;
        let published = input.published.unwrap_or(true);
        let category_ids = input.categories.unwrap_or_default();

        self.check_categories(&category_ids).await?;

        let article = self
            .articles
            .create(author_id, title, content, published, &category_ids)
            .await
            .context("Failed to create article")?;
        Ok(article)
    }

    /// Fetch one of the actor's own articles, optionally narrowed by
    /// category ids.
    pub async fn get_owned(
        &self,
        actor: &Actor,
        id: i64,
        filter: CategoryFilter,
    ) -> Result<Article, ArticleServiceError> {
        let scope = policy::owned_scope(actor, filter)?;
        self.articles
            .get_scoped(&scope, id)
            .await
            .context("Failed to fetch article")?
            .ok_or_else(|| ArticleServiceError::NotFound("Article not found".to_string()))
    }

    /// Replace one of the actor's own articles, optionally narrowed by
    /// category ids like the detail lookup.
    pub async fn update_owned(
        &self,
        actor: &Actor,
        id: i64,
        filter: CategoryFilter,
        input: UpdateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        let scope = policy::owned_scope(actor, filter)?;
        let existing = self
            .articles
            .get_scoped(&scope, id)
            .await
            .context("Failed to fetch article")?
            .ok_or_else(|| ArticleServiceError::NotFound("Article not found".to_string()))?;

        let title = required_field(input.title.as_deref(), "title")?;
        let content = required_field(input.content.as_deref(), "content")?;
        let published = input.published.unwrap_or(existing.published);

        if let Some(category_ids) = input.categories.as_deref() {
            self.check_categories(category_ids).await?;
        }

        self.articles
            .update(id, title, content, published, input.categories.as_deref())
            .await
            .context("Failed to update article")?;

        self.articles
            .get_by_id(id)
            .await
            .context("Failed to reload article")?
            .ok_or_else(|| ArticleServiceError::NotFound("Article not found".to_string()))
    }

    /// Delete one of the actor's own articles, optionally narrowed by
    /// category ids like the detail lookup.
    pub async fn delete_owned(
        &self,
        actor: &Actor,
        id: i64,
        filter: CategoryFilter,
    ) -> Result<(), ArticleServiceError> {
        let scope = policy::owned_scope(actor, filter)?;
        self.articles
            .get_scoped(&scope, id)
            .await
            .context("Failed to fetch article")?
            .ok_or_else(|| ArticleServiceError::NotFound("Article not found".to_string()))?;

        self.articles
            .delete(id)
            .await
            .context("Failed to delete article")?;
        Ok(())
    }

    async fn check_categories(&self, ids: &[i64]) -> Result<(), ArticleServiceError> {
        if ids.is_empty() {
            return Ok(());
        }
        let all_exist = self
            .categories
            .all_exist(ids)
            .await
            .context("Failed to check categories")?;
        if !all_exist {
            return Err(ArticleServiceError::Validation(
                "One or more categories do not exist".to_string(),
            ));
        }
        Ok(())
    }
}

fn required_field<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ArticleServiceError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ArticleServiceError::Validation(format!("{} is required", name))),
    }
}
