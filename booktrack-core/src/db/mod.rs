//! Database layer for booktrack
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for queries
//! - Cascade deletion of a book's reading sessions

pub mod repo;
pub mod schema;

pub use repo::Database;
