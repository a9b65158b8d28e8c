//! SQLite storage implementation for Pricekeeper.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `pricekeeper-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations (the current-price table and the price-change log)
//! - The single-writer actor that serializes every write
//! - Repository implementations and database-specific model types
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!     storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod prices;

// Re-export database utilities
pub use db::{
    create_pool, create_schema, get_connection, init, DbConnection, DbPool, WriteHandle,
};

// Re-export storage errors
pub use errors::StorageError;

// Re-export from pricekeeper-core for convenience
pub use pricekeeper_core::errors::{DatabaseError, Error, Result};
