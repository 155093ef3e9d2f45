//! Business logic services
//!
//! Services sit between the HTTP handlers and the repositories. The policy
//! module is the access-control core; the entity services apply it and own
//! the error taxonomy the API maps to status codes.

pub mod article;
pub mod auth;
pub mod category;
pub mod comment;
pub mod password;
pub mod policy;

pub use article::{ArticleService, ArticleServiceError};
pub use auth::{AuthService, AuthServiceError};
pub use category::{CategoryService, CategoryServiceError};
pub use comment::{CommentService, CommentServiceError};
