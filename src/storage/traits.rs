//! Storage traits and error types
//!
//! This module defines the capability interface a relational backend must
//! provide to hold the active URL table, and the associated error types.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    #[error("Missing store credential(s): {}", .0.join(", "))]
    MissingCredential(Vec<&'static str>),

    #[error("Invalid table name '{0}': must be a plain SQL identifier")]
    InvalidTableName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A relational store that can hand out connections
///
/// Implementations hold only connection parameters; every call to
/// [`UrlStore::connect`] opens a fresh, unshared connection.
#[async_trait]
pub trait UrlStore: Send + Sync {
    type Connection: StoreConnection;

    /// Opens a new connection
    async fn connect(&self) -> StoreResult<Self::Connection>;

    /// Human-readable location of the store, for logs
    fn describe(&self) -> String;
}

/// One open connection to a store
///
/// Transactions are implicit: the first statement after a commit (or after
/// connecting) opens one, and [`StoreConnection::commit`] closes it. Work
/// that was never committed is discarded by [`StoreConnection::close`].
#[async_trait]
pub trait StoreConnection: Send + Sized {
    /// Executes a single DDL or DML statement without parameters
    async fn execute(&mut self, sql: &str) -> StoreResult<()>;

    /// Inserts `urls` into `table` with one multi-row `INSERT`
    ///
    /// # Returns
    ///
    /// The number of rows inserted
    async fn insert_batch(&mut self, table: &str, urls: &[String]) -> StoreResult<u64>;

    /// Commits the open transaction, if any
    async fn commit(&mut self) -> StoreResult<()>;

    /// Rolls back the open transaction, if any
    async fn rollback(&mut self) -> StoreResult<()>;

    /// Counts the rows of `table`
    async fn count_rows(&mut self, table: &str) -> StoreResult<u64>;

    /// Closes the connection, discarding uncommitted work
    async fn close(self) -> StoreResult<()>;
}
