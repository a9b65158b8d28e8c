//! Pricekeeper Core - Domain entities, services, and traits.
//!
//! This crate contains the currency price cache and the mutation pipeline
//! that keeps it consistent with durable storage. It is database-agnostic
//! and defines traits that are implemented by the `storage-sqlite` crate.

pub mod errors;
pub mod prices;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
