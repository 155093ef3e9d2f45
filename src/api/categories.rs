//! Category API endpoints
//!
//! Handles HTTP requests for categories:
//! - GET /api/categories - List categories (public)
//! - GET /api/categories/{id} - Category detail (public)
//! - POST /api/categories - Create a category (auth required)
//! - PUT /api/categories/{id} - Rename a category (auth required)
//! - DELETE /api/categories/{id} - Delete a category (auth required)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::CategoryInput;
use crate::services::CategoryServiceError;

/// Build public category routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{id}", get(get_category))
}

/// Build protected category routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/categories", axum::routing::post(create_category))
        .route(
            "/categories/{id}",
            axum::routing::put(update_category).delete(delete_category),
        )
}

fn map_category_error(e: CategoryServiceError) -> ApiError {
    match e {
        CategoryServiceError::NotFound(msg) => ApiError::not_found(msg),
        CategoryServiceError::Validation(msg) => ApiError::validation_error(msg),
        CategoryServiceError::Conflict(msg) => ApiError::conflict(msg),
        CategoryServiceError::Forbidden(msg) => ApiError::forbidden(msg),
        CategoryServiceError::Unauthorized => ApiError::unauthorized("Authentication required"),
        CategoryServiceError::Internal(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/categories - List all categories
async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .category_service
        .list()
        .await
        .map_err(map_category_error)?;
    Ok(Json(categories))
}

/// GET /api/categories/{id} - Category detail
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .category_service
        .get(id)
        .await
        .map_err(map_category_error)?;
    Ok(Json(category))
}

/// POST /api/categories - Create a category
async fn create_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .category_service
        .create(&user.actor(), body)
        .await
        .map_err(map_category_error)?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id} - Rename a category
async fn update_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<CategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .category_service
        .update(&user.actor(), id, body)
        .await
        .map_err(map_category_error)?;
    Ok(Json(category))
}

/// DELETE /api/categories/{id} - Delete a category
///
/// Articles in the category are detached, not deleted.
async fn delete_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .category_service
        .delete(&user.actor(), id)
        .await
        .map_err(map_category_error)?;
    Ok(StatusCode::NO_CONTENT)
}
