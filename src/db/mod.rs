//! Database layer
//!
//! SQLite-backed persistence for the Quillpress API. Foreign keys are
//! enforced at the connection level so the cascade rules in the schema
//! (user -> articles -> comments, category detachment) actually hold.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
