//! Data models
//!
//! This module contains all data structures used throughout the Quillpress API.
//! Models represent:
//! - Database entities (User, Profile, Category, Article, Comment, AuthToken)
//! - API input types
//! - Internal data transfer objects

mod article;
mod category;
mod comment;
mod token;
mod user;

pub use article::{Article, CreateArticleInput, UpdateArticleInput};
pub use category::{Category, CategoryInput};
pub use comment::{Comment, CreateCommentInput};
pub use token::{AuthToken, TokenKind, TokenPair};
pub use user::{Profile, RegisterInput, User};
