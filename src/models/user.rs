//! User and profile models
//!
//! Defines the User entity, its one-to-one Profile, and registration input.
//! The password hash never leaves the server (`skip_serializing`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a registered account.
///
/// A user owns zero or more articles and comments and has exactly one
/// profile, created alongside the account and destroyed with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User. The password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Profile entity, one-to-one with a user.
///
/// Holds an opaque token slot refreshed at login. Lifecycle is tied to the
/// owning user: created in the same transaction, removed by cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier
    pub id: i64,
    /// Owning user id (unique)
    pub user_id: i64,
    /// Opaque token slot
    pub token: Option<String>,
}

/// Input for registering a new user
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Plaintext password (will be hashed)
    pub password: String,
}
