//! Article repository
//!
//! All reads go through an `ArticleScope` from the policy layer, so the
//! ownership and category-filter rules are applied before any lookup by id.
//! Creation and update run in one transaction covering the article row and
//! its category links.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::models::Article;
use crate::services::policy::{ArticleScope, CategoryFilter};

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Create an article with its category links in one transaction
    async fn create(
        &self,
        author_id: i64,
        title: &str,
        content: &str,
        published: bool,
        category_ids: &[i64],
    ) -> Result<Article>;

    /// List the articles visible in a scope
    async fn list(&self, scope: &ArticleScope) -> Result<Vec<Article>>;

    /// Look up a single article by id within a scope
    async fn get_scoped(&self, scope: &ArticleScope, id: i64) -> Result<Option<Article>>;

    /// Unscoped lookup, used to resolve comment targets
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Replace an article's fields; `categories`, when present, replaces the set
    async fn update(
        &self,
        id: i64,
        title: &str,
        content: &str,
        published: bool,
        categories: Option<&[i64]>,
    ) -> Result<()>;

    /// Delete an article (cascades to comments and category links)
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// sqlx-backed article repository
pub struct SqlxArticleRepository {
    pool: SqlitePool,
}

impl SqlxArticleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn category_ids(&self, article_id: i64) -> Result<Vec<i64>> {
        let rows = sqlx::query(
            "SELECT category_id FROM article_categories WHERE article_id = ? ORDER BY category_id",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|r| r.get("category_id")).collect())
    }

    async fn attach_categories(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
        let id: i64 = row.get("id");
        Ok(Article {
            id,
            title: row.get("title"),
            content: row.get("content"),
            published: row.get("published"),
            author: row.get("author_id"),
            categories: self.category_ids(id).await?,
        })
    }
}

enum ScopeBind {
    Int(i64),
    Text(String),
}

/// Translate a scope into SQL fragments: join clause, conditions, binds.
/// Returns `None` when the scope provably matches nothing (an applied
/// category filter whose id set came out empty).
fn scope_clauses(scope: &ArticleScope) -> Option<(String, Vec<String>, Vec<ScopeBind>)> {
    match scope {
        ArticleScope::Public { filter } => filter_clauses(filter),
        ArticleScope::Owned { author_id, filter } => {
            let (join, mut conds, mut binds) = filter_clauses(filter)?;
            conds.push("a.author_id = ?".to_string());
            binds.push(ScopeBind::Int(*author_id));
            Some((join, conds, binds))
        }
        ArticleScope::PublishedInCategory { name } => Some((
            " JOIN article_categories ac ON ac.article_id = a.id \
             JOIN categories c ON c.id = ac.category_id"
                .to_string(),
            vec!["c.name = ?".to_string(), "a.published = 1".to_string()],
            vec![ScopeBind::Text(name.clone())],
        )),
    }
}

fn filter_clauses(filter: &CategoryFilter) -> Option<(String, Vec<String>, Vec<ScopeBind>)> {
    match filter.id_set() {
        None => Some((String::new(), Vec::new(), Vec::new())),
        Some([]) => None,
        Some(ids) => {
            let placeholders = vec!["?"; ids.len()].join(",");
            Some((
                " JOIN article_categories ac ON ac.article_id = a.id".to_string(),
                vec![format!("ac.category_id IN ({})", placeholders)],
                ids.iter().map(|id| ScopeBind::Int(*id)).collect(),
            ))
        }
    }
}

fn bind_all<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    binds: &'q [ScopeBind],
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    for bind in binds {
        query = match bind {
            ScopeBind::Int(value) => query.bind(*value),
            ScopeBind::Text(value) => query.bind(value.as_str()),
        };
    }
    query
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(
        &self,
        author_id: i64,
        title: &str,
        content: &str,
        published: bool,
        category_ids: &[i64],
    ) -> Result<Article> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO articles (title, content, published, author_id) VALUES (?, ?, ?, ?)",
        )
        .bind(title)
        .bind(content)
        .bind(published)
        .bind(author_id)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();

        for category_id in category_ids {
            sqlx::query("INSERT INTO article_categories (article_id, category_id) VALUES (?, ?)")
                .bind(id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Article {
            id,
            title: title.to_string(),
            content: content.to_string(),
            published,
            author: author_id,
            categories: {
                let mut ids = category_ids.to_vec();
                ids.sort();
                ids.dedup();
                ids
            },
        })
    }

    async fn list(&self, scope: &ArticleScope) -> Result<Vec<Article>> {
        let Some((join, conds, binds)) = scope_clauses(scope) else {
            return Ok(Vec::new());
        };

        let mut sql = format!("SELECT DISTINCT a.* FROM articles a{}", join);
        if !conds.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conds.join(" AND "));
        }
        sql.push_str(" ORDER BY a.id");

        let rows = bind_all(sqlx::query(&sql), &binds)
            .fetch_all(&self.pool)
            .await?;

        let mut articles = Vec::with_capacity(rows.len());
        for row in &rows {
            articles.push(self.attach_categories(row).await?);
        }
        Ok(articles)
    }

    async fn get_scoped(&self, scope: &ArticleScope, id: i64) -> Result<Option<Article>> {
        let Some((join, mut conds, mut binds)) = scope_clauses(scope) else {
            return Ok(None);
        };
        conds.push("a.id = ?".to_string());
        binds.push(ScopeBind::Int(id));

        let sql = format!(
            "SELECT DISTINCT a.* FROM articles a{} WHERE {}",
            join,
            conds.join(" AND ")
        );

        let row = bind_all(sqlx::query(&sql), &binds)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.attach_categories(&row).await?)),
            None => Ok(None),
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.attach_categories(&row).await?)),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        content: &str,
        published: bool,
        categories: Option<&[i64]>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE articles SET title = ?, content = ?, published = ? WHERE id = ?")
            .bind(title)
            .bind(content)
            .bind(published)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(category_ids) = categories {
            sqlx::query("DELETE FROM article_categories WHERE article_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for category_id in category_ids {
                sqlx::query(
                    "INSERT INTO article_categories (article_id, category_id) VALUES (?, ?)",
                )
                .bind(id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
