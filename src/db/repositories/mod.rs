//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod article;
pub mod category;
pub mod comment;
pub mod token;
pub mod user;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use token::{SqlxTokenRepository, TokenRepository};
pub use user::{SqlxUserRepository, UserRepository};
