//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the Quillpress blog
//! system:
//! - Auth endpoints (register, login, refresh, logout)
//! - Article endpoints (public listing plus owner-scoped CRUD)
//! - Comment endpoints (nested under their hosting article)
//! - Category endpoints (open reads, authenticated mutation)

pub mod articles;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod middleware;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Protected routes (need auth)
    let protected_routes = Router::new()
        .merge(articles::protected_router())
        .merge(comments::protected_router())
        .merge(categories::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::public_router())
        .merge(articles::public_router())
        .merge(comments::public_router())
        .merge(categories::public_router())
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
