//! Quillpress - A blog publishing API with ownership-scoped access control

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quillpress::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxArticleRepository, SqlxCategoryRepository, SqlxCommentRepository,
            SqlxTokenRepository, SqlxUserRepository,
        },
    },
    services::{ArticleService, AuthService, CategoryService, CommentService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quillpress=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Quillpress API...");

    // Load configuration
    let config = Config::load(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let user_repo = Arc::new(SqlxUserRepository::new(pool.clone()));
    let token_repo = Arc::new(SqlxTokenRepository::new(pool.clone()));
    let article_repo = Arc::new(SqlxArticleRepository::new(pool.clone()));
    let category_repo = Arc::new(SqlxCategoryRepository::new(pool.clone()));
    let comment_repo = Arc::new(SqlxCommentRepository::new(pool.clone()));

    // Initialize services
    let auth_service = Arc::new(AuthService::new(user_repo, token_repo, &config.auth));
    let article_service = Arc::new(ArticleService::new(
        article_repo.clone(),
        category_repo.clone(),
    ));
    let comment_service = Arc::new(CommentService::new(comment_repo, article_repo));
    let category_service = Arc::new(CategoryService::new(category_repo));

    // Build application state
    let state = AppState {
        pool,
        auth_service,
        article_service,
        comment_service,
        category_service,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
