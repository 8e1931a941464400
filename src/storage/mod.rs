//! `SQLite` storage layer for `dropdesk`.
//!
//! This module provides the persistence layer using `SQLite` with:
//! - One table per object store, records held as JSON
//! - Versioned, additive schema migrations
//! - Transaction discipline for atomic writes
//!
//! # Submodules
//!
//! - [`handle`] - Shared, lazily-opened [`Database`] handle
//! - [`repos`] - Typed repositories
//! - [`schema`] - Database schema definitions and migrations
//! - [`sqlite`] - Main `SQLite` storage implementation
//! - [`store`] - Generic object-store primitives and policies

pub mod handle;
pub mod repos;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use handle::Database;
pub use repos::Repository;
pub use sqlite::{MutationContext, SqliteStorage};
