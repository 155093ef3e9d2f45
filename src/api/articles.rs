//! Article API endpoints
//!
//! Handles HTTP requests for articles:
//! - GET /api/articles - Public listing, drafts included
//! - POST /api/articles - Create an article (auth required)
//! - GET /api/user/articles - The caller's own articles
//! - GET/PUT/DELETE /api/articles/{id} - Owner-scoped detail operations
//! - GET /api/articles/category/{name} - Published articles in a category
//!
//! List and detail endpoints accept `?category=1,2` to narrow by category
//! ids with OR semantics.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CreateArticleInput, UpdateArticleInput};
use crate::services::policy::CategoryFilter;
use crate::services::ArticleServiceError;

/// Query parameters for article listings
#[derive(Debug, Default, Deserialize)]
pub struct ListArticlesQuery {
    pub category: Option<String>,
}

impl ListArticlesQuery {
    fn filter(&self) -> CategoryFilter {
        CategoryFilter::from_query(self.category.as_deref())
    }
}

/// Build public article routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles))
        .route("/articles/category/{name}", get(list_articles_by_category))
}

/// Build protected article routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/articles", axum::routing::post(create_article))
        .route("/user/articles", get(list_own_articles))
        .route(
            "/articles/{article_id}",
            get(get_article).put(update_article).delete(delete_article),
        )
}

fn map_article_error(e: ArticleServiceError) -> ApiError {
    match e {
        ArticleServiceError::NotFound(msg) => ApiError::not_found(msg),
        ArticleServiceError::Validation(msg) => ApiError::validation_error(msg),
        ArticleServiceError::Forbidden(msg) => ApiError::forbidden(msg),
        ArticleServiceError::Unauthorized => ApiError::unauthorized("Authentication required"),
        ArticleServiceError::Internal(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/articles - List every article, drafts included
async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let articles = state
        .article_service
        .list_public(query.filter())
        .await
        .map_err(map_article_error)?;
    Ok(Json(articles))
}

/// GET /api/articles/category/{name} - Published articles in a category
///
/// A missing category and a category with no published articles both come
/// back as an empty list.
async fn list_articles_by_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let articles = state
        .article_service
        .list_by_category_name(&name)
        .await
        .map_err(map_article_error)?;
    Ok(Json(articles))
}

/// GET /api/user/articles - The caller's own articles
async fn list_own_articles(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListArticlesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let articles = state
        .article_service
        .list_owned(&user.actor(), query.filter())
        .await
        .map_err(map_article_error)?;
    Ok(Json(articles))
}

/// POST /api/articles - Create an article
///
/// The author is always the caller; an `author` field in the payload is
/// ignored.
async fn create_article(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateArticleInput>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state
        .article_service
        .create(&user.actor(), body)
        .await
        .map_err(map_article_error)?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// GET /api/articles/{id} - One of the caller's own articles
///
/// A foreign article id yields the same 404 as a missing one.
async fn get_article(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state
        .article_service
        .get_owned(&user.actor(), id, query.filter())
        .await
        .map_err(map_article_error)?;
    Ok(Json(article))
}

/// PUT /api/articles/{id} - Replace one of the caller's own articles
///
/// `?category=` narrows the lookup the same way it does for GET.
async fn update_article(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Query(query): Query<ListArticlesQuery>,
    Json(body): Json<UpdateArticleInput>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state
        .article_service
        .update_owned(&user.actor(), id, query.filter(), body)
        .await
        .map_err(map_article_error)?;
    Ok(Json(article))
}

/// DELETE /api/articles/{id} - Delete one of the caller's own articles
///
/// `?category=` narrows the lookup the same way it does for GET.
async fn delete_article(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .article_service
        .delete_owned(&user.actor(), id, query.filter())
        .await
        .map_err(map_article_error)?;
    Ok(StatusCode::NO_CONTENT)
}
