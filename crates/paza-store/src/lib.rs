//! Paza Store - Durable state for the offline sync engine
//!
//! SQLite-based persistence for:
//! - The deferred operation log (pending and dead-lettered operations)
//! - User preferences (the offline-mode flag)
//!
//! ## Architecture
//!
//! This crate implements the `IOperationStore` and `IPreferenceStore` ports
//! from `paza-core` using SQLite as the storage backend. It is a driven
//! (secondary) adapter in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteOperationStore`] - `IOperationStore` implementation
//! - [`SqlitePreferenceStore`] - `IPreferenceStore` implementation
//! - [`StoreError`] - Error types for storage operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use paza_store::{DatabasePool, SqliteOperationStore, SqlitePreferenceStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/home/user/.local/share/paza/paza.db")).await?;
//! let operations = SqliteOperationStore::new(pool.pool().clone());
//! let preferences = SqlitePreferenceStore::new(pool.pool().clone());
//! // Use as IOperationStore / IPreferenceStore...
//! # Ok(())
//! # }
//! ```

pub mod operations;
pub mod pool;
pub mod preferences;

pub use operations::SqliteOperationStore;
pub use pool::DatabasePool;
pub use preferences::SqlitePreferenceStore;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization or deserialization of domain types failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
