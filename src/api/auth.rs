//! Authentication API endpoints
//!
//! Handles HTTP requests for account and token lifecycle:
//! - POST /api/auth/register - User registration
//! - POST /api/auth/login - User login (issues access + refresh tokens)
//! - POST /api/auth/token/refresh - Mint a new access token
//! - POST /api/auth/logout - Blacklist a refresh token

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::RegisterInput;
use crate::services::AuthServiceError;

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body carrying a refresh token (logout and refresh)
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh: String,
}

/// Response for successful registration
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Response for successful login
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

/// Response for a token refresh
#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

impl From<crate::models::User> for UserResponse {
    fn from(user: crate::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token/refresh", post(refresh))
        .route("/logout", post(logout))
}

fn map_auth_error(e: AuthServiceError) -> ApiError {
    match e {
        AuthServiceError::Validation(msg) => ApiError::validation_error(msg),
        AuthServiceError::Conflict(msg) => ApiError::conflict(msg),
        AuthServiceError::InvalidToken => ApiError::invalid_token(),
        AuthServiceError::Internal(e) => ApiError::internal_error(e.to_string()),
    }
}

/// POST /api/auth/register - User registration
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .auth_service
        .register(body)
        .await
        .map_err(map_auth_error)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /api/auth/login - User login
///
/// Bad credentials are a validation failure, indistinguishable between an
/// unknown username and a wrong password.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let pair = state
        .auth_service
        .login(&body.username, &body.password)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(TokenPairResponse {
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// POST /api/auth/token/refresh - Mint a new access token
async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let access = state
        .auth_service
        .refresh(&body.refresh)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(AccessTokenResponse { access }))
}

/// POST /api/auth/logout - Blacklist a refresh token
///
/// Succeeds with 205 Reset Content; an invalid or already blacklisted token
/// is a 400.
async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .auth_service
        .logout(&body.refresh)
        .await
        .map_err(map_auth_error)?;

    Ok(StatusCode::RESET_CONTENT)
}
