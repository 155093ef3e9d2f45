//! Quillpress - a blog publishing API
//!
//! This library provides the core functionality for the Quillpress API:
//! user accounts, articles grouped by category, and flagged comments,
//! with ownership-scoped access control.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
