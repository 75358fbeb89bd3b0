//! Storage module for the active URL table
//!
//! This module handles all database operations, including:
//! - The connection and transaction capabilities a backend must provide
//! - SQLite (default) and PostgreSQL (feature `postgres`) backends
//! - Table naming and DDL text
//! - Atomic replacement of the active table

#[cfg(feature = "postgres")]
mod postgres;
mod replacer;
mod schema;
mod sqlite;
mod traits;

#[cfg(feature = "postgres")]
pub use postgres::{PostgresConnection, PostgresStore};
pub use replacer::{
    ActiveTableState, ReplaceError, ReplaceOptions, ReplaceReport, SchemaStep, StoreReplacer,
};
pub use schema::{staging_table_name, validate_table_name, STAGING_SUFFIX};
pub use sqlite::{SqliteConnection, SqliteStore};
pub use traits::{StoreConnection, StoreError, StoreResult, UrlStore};

/// Opens a connection and counts the rows of `table`
///
/// # Returns
///
/// * `Ok(u64)` - Current row count
/// * `Err(StoreError)` - Connection failed or the table does not exist
pub async fn count_active_rows<S: UrlStore>(store: &S, table: &str) -> StoreResult<u64> {
    validate_table_name(table)?;
    let mut conn = store.connect().await?;
    let count = conn.count_rows(table).await?;
    conn.close().await?;
    Ok(count)
}
