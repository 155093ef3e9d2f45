//! Category service
//!
//! Reads are open to everyone; create, update, and delete require an
//! authenticated actor. Names are unique.

use anyhow::Context;
use std::sync::Arc;

use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CategoryInput};
use crate::services::policy::{self, Actor, PolicyError};

/// Error types for category operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// No category with the given id
    #[error("{0}")]
    NotFound(String),

    /// Malformed input
    #[error("{0}")]
    Validation(String),

    /// Name already taken
    #[error("{0}")]
    Conflict(String),

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

impl From<PolicyError> for CategoryServiceError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Unauthorized => CategoryServiceError::Unauthorized,
            PolicyError::Forbidden(msg) => CategoryServiceError::Forbidden(msg),
        }
    }
}

/// Category service
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        let categories = self
            .categories
            .list()
            .await
            .context("Failed to list categories")?;
        Ok(categories)
    }

    pub async fn get(&self, id: i64) -> Result<Category, CategoryServiceError> {
        self.categories
            .get_by_id(id)
            .await
            .context("Failed to fetch category")?
            .ok_or_else(|| CategoryServiceError::NotFound("Category not found".to_string()))
    }

    pub async fn create(
        &self,
        actor: &Actor,
        input: CategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        policy::can_mutate_categories(actor)?;
        let name = self.valid_name(&input).await?;

        let category = self
            .categories
            .create(&name)
            .await
            .context("Failed to create category")?;
        Ok(category)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: i64,
        input: CategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        policy::can_mutate_categories(actor)?;
        let existing = self.get(id).await?;
        let name = input.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(CategoryServiceError::Validation(
                "name is required".to_string(),
            ));
        }

        // Renaming to its own current name is a no-op, not a conflict
        if name != existing.name {
            if let Some(other) = self
                .categories
                .get_by_name(name)
                .await
                .context("Failed to check category name")?
            {
                if other.id != id {
                    return Err(CategoryServiceError::Conflict(format!(
                        "Category '{}' already exists",
                        name
                    )));
                }
            }
        }

        self.categories
            .update(id, name)
            .await
            .context("Failed to update category")?;
        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    pub async fn delete(&self, actor: &Actor, id: i64) -> Result<(), CategoryServiceError> {
        policy::can_mutate_categories(actor)?;
        let deleted = self
            .categories
            .delete(id)
            .await
            .context("Failed to delete category")?;
        if !deleted {
            return Err(CategoryServiceError::NotFound(
                "Category not found".to_string(),
            ));
        }
        Ok(())
    }

    async fn valid_name(&self, input: &CategoryInput) -> Result<String, CategoryServiceError> {
        let name = input.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(CategoryServiceError::Validation(
                "name is required".to_string(),
            ));
        }
        if self
            .categories
            .get_by_name(name)
            .await
            .context("Failed to check category name")?
            .is_some()
        {
            return Err(CategoryServiceError::Conflict(format!(
                "Category '{}' already exists",
                name
            )));
        }
        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCategoryRepository;
    use crate::db::{create_test_pool, migrations::run_migrations};

    async fn setup() -> CategoryService {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Migrations should apply");
        CategoryService::new(Arc::new(SqlxCategoryRepository::new(pool)))
    }

    fn name(value: &str) -> CategoryInput {
        CategoryInput {
            name: Some(value.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let service = setup().await;
        let rust = service.create(&Actor::User(1), name("rust")).await.unwrap();
        assert_eq!(rust.name, "rust");

        let all = service.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(service.get(rust.id).await.unwrap().name, "rust");
    }

    #[tokio::test]
    async fn test_mutation_requires_authentication() {
        let service = setup().await;
        assert!(matches!(
            service.create(&Actor::Anonymous, name("rust")).await,
            Err(CategoryServiceError::Unauthorized)
        ));
        assert!(matches!(
            service.update(&Actor::Anonymous, 1, name("rust")).await,
            Err(CategoryServiceError::Unauthorized)
        ));
        assert!(matches!(
            service.delete(&Actor::Anonymous, 1).await,
            Err(CategoryServiceError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_create_validates_and_deduplicates_names() {
        let service = setup().await;
        assert!(matches!(
            service.create(&Actor::User(1), name("  ")).await,
            Err(CategoryServiceError::Validation(_))
        ));

        service.create(&Actor::User(1), name("rust")).await.unwrap();
        assert!(matches!(
            service.create(&Actor::User(2), name("rust")).await,
            Err(CategoryServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_update_renames_and_checks_conflicts() {
        let service = setup().await;
        let rust = service.create(&Actor::User(1), name("rust")).await.unwrap();
        service.create(&Actor::User(1), name("web")).await.unwrap();

        let renamed = service
            .update(&Actor::User(1), rust.id, name("systems"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "systems");

        // Same-name update is allowed
        service
            .update(&Actor::User(1), rust.id, name("systems"))
            .await
            .unwrap();

        assert!(matches!(
            service.update(&Actor::User(1), rust.id, name("web")).await,
            Err(CategoryServiceError::Conflict(_))
        ));
        assert!(matches!(
            service.update(&Actor::User(1), 999, name("x")).await,
            Err(CategoryServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let service = setup().await;
        let rust = service.create(&Actor::User(1), name("rust")).await.unwrap();

        service.delete(&Actor::User(1), rust.id).await.unwrap();
        assert!(matches!(
            service.delete(&Actor::User(1), rust.id).await,
            Err(CategoryServiceError::NotFound(_))
        ));
    }
}
