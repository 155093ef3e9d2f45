//! Category model
//!
//! Categories have a unique name and an independent lifecycle: deleting one
//! detaches it from articles without touching the articles themselves.

use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category name (unique)
    pub name: String,
}

/// Input for creating or replacing a category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    /// Category name (required)
    pub name: Option<String>,
}
