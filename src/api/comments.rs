//! Comment API endpoints
//!
//! Handles HTTP requests for comments, always addressed through their
//! hosting article:
//! - POST /api/articles/{article_id}/comments - Comment on an article
//! - GET /api/articles/{article_id}/all-comments - List an article's comments
//! - PATCH /api/articles/{article_id}/comments/{id}/flag - Toggle the flag

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::CreateCommentInput;
use crate::services::CommentServiceError;

/// Build public comment routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new().route(
        "/articles/{article_id}/all-comments",
        axum::routing::get(list_comments),
    )
}

/// Build protected comment routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route(
            "/articles/{article_id}/comments",
            axum::routing::post(create_comment),
        )
        .route(
            "/articles/{article_id}/comments/{id}/flag",
            axum::routing::patch(toggle_flag),
        )
}

fn map_comment_error(e: CommentServiceError) -> ApiError {
    match e {
        CommentServiceError::NotFound(msg) => ApiError::not_found(msg),
        CommentServiceError::Validation(msg) => ApiError::validation_error(msg),
        CommentServiceError::Forbidden(msg) => ApiError::forbidden(msg),
        CommentServiceError::Unauthorized => ApiError::unauthorized("Authentication required"),
        CommentServiceError::Internal(e) => ApiError::internal_error(e.to_string()),
    }
}

/// POST /api/articles/{article_id}/comments - Comment on an article
///
/// The article comes from the path and the author from the caller; a
/// missing article is a 400, not a 404.
async fn create_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(article_id): Path<i64>,
    Json(body): Json<CreateCommentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .comment_service
        .create(&user.actor(), article_id, body)
        .await
        .map_err(map_comment_error)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/articles/{article_id}/all-comments - List an article's comments
///
/// An article with zero comments yields the same 404 as a missing article.
async fn list_comments(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = state
        .comment_service
        .list(article_id)
        .await
        .map_err(map_comment_error)?;
    Ok(Json(comments))
}

/// PATCH /api/articles/{article_id}/comments/{id}/flag - Toggle the flag
///
/// Only the article's author may toggle; the response carries the new
/// flag value.
async fn toggle_flag(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((article_id, comment_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .comment_service
        .toggle_flag(&user.actor(), article_id, comment_id)
        .await
        .map_err(map_comment_error)?;
    Ok(Json(comment))
}
