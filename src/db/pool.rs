//! Database connection pool
//!
//! Creates the SQLite pool from configuration, ensuring the database
//! directory exists and that foreign key enforcement is switched on for
//! every connection (SQLite defaults to off, which would silently break
//! every cascade).

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

fn is_memory_url(url: &str) -> bool {
    url == ":memory:" || url.starts_with("sqlite::memory:")
}

/// Create a SQLite connection pool from configuration.
///
/// An in-memory database is pinned to a single connection; every pooled
/// connection to `:memory:` would otherwise be a separate empty database.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let url = &config.url;

    let options = if is_memory_url(url) {
        "sqlite::memory:".parse::<SqliteConnectOptions>()?
    } else {
        let path = url.strip_prefix("sqlite:").unwrap_or(url);

        // Ensure the database directory exists for file-based SQLite
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
            }
        }

        SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
    };

    let max_connections = if is_memory_url(url) { 1 } else { 20 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options.foreign_keys(true))
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

    Ok(pool)
}

/// Create an in-memory pool for tests.
pub async fn create_test_pool() -> Result<SqlitePool> {
    let config = DatabaseConfig {
        url: ":memory:".to_string(),
    };
    create_pool(&config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_pool_creation() {
        let pool = create_test_pool().await.expect("Failed to create pool");
        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("Ping should succeed");
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let pool = create_test_pool().await.expect("Failed to create pool");
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("pragma query should succeed");
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_memory_pool_state_survives_across_queries() {
        let pool = create_test_pool().await.expect("Failed to create pool");
        sqlx::query("CREATE TABLE t (id INTEGER PRIMARY KEY)")
            .execute(&pool)
            .await
            .expect("create should succeed");
        sqlx::query("INSERT INTO t (id) VALUES (1)")
            .execute(&pool)
            .await
            .expect("insert should succeed");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t")
            .fetch_one(&pool)
            .await
            .expect("count should succeed");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_file_pool_creates_nested_directory() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("test.db");

        let config = DatabaseConfig {
            url: db_path.to_string_lossy().to_string(),
        };

        let pool = create_pool(&config).await.expect("Failed to create pool");
        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("Ping should succeed");
        assert!(db_path.exists());
    }
}
