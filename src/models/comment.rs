//! Comment model
//!
//! A comment belongs to exactly one article and one authoring user, both
//! fixed at creation. Only the `flagged` bit is mutable afterwards, and only
//! by the hosting article's author. Comments start flagged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: i64,
    /// Hosting article id (fixed at creation)
    pub article: i64,
    /// Authoring user id (fixed at creation)
    pub user: i64,
    /// Comment body
    pub content: String,
    /// Moderation flag (defaults to true)
    pub flagged: bool,
    /// Creation timestamp (set once, never mutated)
    pub created_at: DateTime<Utc>,
}

/// Input for creating a comment.
///
/// The article binding comes from the URL path and the author from the
/// authenticated actor; neither is settable from the payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCommentInput {
    /// Comment body (required)
    pub content: Option<String>,
}
