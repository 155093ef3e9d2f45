//! Category repository

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::models::Category;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a category
    async fn create(&self, name: &str) -> Result<Category>;

    /// List all categories
    async fn list(&self) -> Result<Vec<Category>>;

    /// Get a category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get a category by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Category>>;

    /// Rename a category
    async fn update(&self, id: i64, name: &str) -> Result<bool>;

    /// Delete a category; links to articles are removed, articles stay
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Check that every id in the slice names an existing category
    async fn all_exist(&self, ids: &[i64]) -> Result<bool>;
}

/// sqlx-backed category repository
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, name: &str) -> Result<Category> {
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT * FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| row_to_category(&r)))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT * FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| row_to_category(&r)))
    }

    async fn update(&self, id: i64, name: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn all_exist(&self, ids: &[i64]) -> Result<bool> {
        if ids.is_empty() {
            return Ok(true);
        }

        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!(
            "SELECT COUNT(DISTINCT id) FROM categories WHERE id IN ({})",
            placeholders
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let count = query.fetch_one(&self.pool).await?;

        let mut distinct: Vec<i64> = ids.to_vec();
        distinct.sort();
        distinct.dedup();
        Ok(count == distinct.len() as i64)
    }
}
