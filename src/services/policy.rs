//! Access policy layer
//!
//! Pure decision logic for the Quillpress API: given an actor and a
//! requested operation, decide allow/deny and describe the visible record
//! set. Nothing here touches the database; repositories interpret the
//! scopes this module produces, and handlers pass the actor in explicitly
//! rather than reading any ambient request state.
//!
//! The rules this module encodes:
//! - Public article listing is open to everyone, optionally narrowed by a
//!   comma-separated category-id filter with OR semantics.
//! - Owner-scoped article access pre-filters to the actor's own articles,
//!   so a foreign article id looks exactly like a missing one.
//! - Only an article's author may toggle the flag on its comments.
//! - Category mutation requires an authenticated actor; reads are open.

use thiserror::Error;

/// The identity attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// No credentials presented
    Anonymous,
    /// Authenticated user id
    User(i64),
}

impl Actor {
    /// The user id, if authenticated.
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Actor::Anonymous => None,
            Actor::User(id) => Some(*id),
        }
    }

    /// Require an authenticated actor.
    pub fn require_user(&self) -> Result<i64, PolicyError> {
        self.user_id().ok_or(PolicyError::Unauthorized)
    }
}

/// Policy decision errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The operation requires an authenticated actor
    #[error("Authentication required")]
    Unauthorized,
    /// The actor is authenticated but lacks the required ownership
    #[error("{0}")]
    Forbidden(String),
}

/// A category filter parsed from the `category` query parameter.
///
/// Absent or empty input means "no filter". Present input always applies,
/// even when every token is garbage: `?category=,` filters against an empty
/// id set and therefore matches nothing, and an applied filter never matches
/// an article with no category memberships.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryFilter(Option<Vec<i64>>);

impl CategoryFilter {
    /// The no-filter value.
    pub fn none() -> Self {
        Self(None)
    }

    /// An explicit id set.
    pub fn ids(ids: Vec<i64>) -> Self {
        Self(Some(ids))
    }

    /// Parse the raw query parameter.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            None => Self(None),
            Some(s) if s.is_empty() => Self(None),
            Some(s) => Self(Some(
                s.split(',')
                    .filter_map(|token| token.trim().parse::<i64>().ok())
                    .collect(),
            )),
        }
    }

    /// Whether a filter is applied at all.
    pub fn is_applied(&self) -> bool {
        self.0.is_some()
    }

    /// The id set, when applied.
    pub fn id_set(&self) -> Option<&[i64]> {
        self.0.as_deref()
    }

    /// OR-match against an article's category memberships.
    pub fn matches(&self, article_categories: &[i64]) -> bool {
        match &self.0 {
            None => true,
            Some(ids) => article_categories.iter().any(|c| ids.contains(c)),
        }
    }
}

/// The set of articles an operation is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleScope {
    /// Every article, optionally narrowed by category ids
    Public { filter: CategoryFilter },
    /// Only articles owned by the given author, optionally narrowed
    Owned {
        author_id: i64,
        filter: CategoryFilter,
    },
    /// Only published articles in the named category
    PublishedInCategory { name: String },
}

/// Public listing: open to anonymous and authenticated actors alike.
pub fn public_scope(filter: CategoryFilter) -> ArticleScope {
    ArticleScope::Public { filter }
}

/// Owner-scoped listing and detail lookups.
///
/// The scope is pre-filtered to the actor's own articles before any lookup
/// by id, which is why a foreign article yields not-found rather than
/// forbidden.
pub fn owned_scope(actor: &Actor, filter: CategoryFilter) -> Result<ArticleScope, PolicyError> {
    let author_id = actor.require_user()?;
    Ok(ArticleScope::Owned { author_id, filter })
}

/// Published articles in a named category; no authentication required.
pub fn category_scope(name: impl Into<String>) -> ArticleScope {
    ArticleScope::PublishedInCategory { name: name.into() }
}

/// Article creation requires authentication; the returned id is the forced
/// author, regardless of anything in the payload.
pub fn creation_author(actor: &Actor) -> Result<i64, PolicyError> {
    actor.require_user()
}

/// Comment creation requires authentication; any actor may comment on any
/// article, including their own.
pub fn comment_author(actor: &Actor) -> Result<i64, PolicyError> {
    actor.require_user()
}

/// Only the hosting article's author may toggle a comment's flag. The
/// comment's own author gets no special treatment.
pub fn can_toggle_flag(actor: &Actor, article_author_id: i64) -> Result<(), PolicyError> {
    let user_id = actor.require_user()?;
    if user_id != article_author_id {
        return Err(PolicyError::Forbidden(
            "You can only flag comments on your own articles".to_string(),
        ));
    }
    Ok(())
}

/// Category mutation (create/update/delete) requires an authenticated
/// actor; list and retrieve stay open.
pub fn can_mutate_categories(actor: &Actor) -> Result<i64, PolicyError> {
    actor.require_user()
}
