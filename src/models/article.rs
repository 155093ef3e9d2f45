//! Article model
//!
//! An article has exactly one owning author, fixed at creation and never
//! settable from a request payload, plus a set of zero or more categories.

use serde::{Deserialize, Serialize};

/// Article entity with its category memberships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Article title
    pub title: String,
    /// Article body
    pub content: String,
    /// Published flag (defaults to true)
    pub published: bool,
    /// Owning author id (immutable after creation)
    pub author: i64,
    /// Ids of categories this article belongs to
    pub categories: Vec<i64>,
}

/// Input for creating an article.
///
/// The author is never part of the payload; it is forced to the requesting
/// actor. Unknown fields in the request body are ignored by serde, so a
/// supplied `author` has no effect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateArticleInput {
    /// Article title (required)
    pub title: Option<String>,
    /// Article body (required)
    pub content: Option<String>,
    /// Published flag, defaults to true
    pub published: Option<bool>,
    /// Category ids to attach; every id must exist
    pub categories: Option<Vec<i64>>,
}

/// Input for replacing an article (PUT semantics).
///
/// Title and content are required; categories, when present, replace the
/// current set and are otherwise left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateArticleInput {
    /// New title (required)
    pub title: Option<String>,
    /// New body (required)
    pub content: Option<String>,
    /// New published flag (optional)
    pub published: Option<bool>,
    /// Replacement category set (optional)
    pub categories: Option<Vec<i64>>,
}
