//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the store traits.

use crate::storage::schema::{count_rows_sql, insert_batch_sql};
use crate::storage::traits::{StoreConnection, StoreResult, UrlStore};
use async_trait::async_trait;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// SQLite store backed by a single database file
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl UrlStore for SqliteStore {
    type Connection = SqliteConnection;

    /// Opens (creating if needed) the database file
    ///
    /// The parent directory must already exist.
    async fn connect(&self) -> StoreResult<SqliteConnection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        Ok(SqliteConnection {
            conn,
            in_transaction: false,
        })
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

/// An open SQLite connection with an implicit transaction
pub struct SqliteConnection {
    conn: Connection,
    in_transaction: bool,
}

impl SqliteConnection {
    fn begin_if_needed(&mut self) -> StoreResult<()> {
        if !self.in_transaction {
            self.conn.execute_batch("BEGIN")?;
            self.in_transaction = true;
        }
        Ok(())
    }
}

#[async_trait]
impl StoreConnection for SqliteConnection {
    async fn execute(&mut self, sql: &str) -> StoreResult<()> {
        self.begin_if_needed()?;
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    async fn insert_batch(&mut self, table: &str, urls: &[String]) -> StoreResult<u64> {
        if urls.is_empty() {
            return Ok(0);
        }
        self.begin_if_needed()?;

        let sql = insert_batch_sql(table, urls.len(), |n| format!("?{}", n));
        let inserted = self.conn.execute(&sql, params_from_iter(urls.iter()))?;
        Ok(inserted as u64)
    }

    async fn commit(&mut self) -> StoreResult<()> {
        if self.in_transaction {
            self.conn.execute_batch("COMMIT")?;
            self.in_transaction = false;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        if self.in_transaction {
            self.in_transaction = false;
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    async fn count_rows(&mut self, table: &str) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row(&count_rows_sql(table), [], |row| row.get(0))?;
        Ok(count as u64)
    }

    async fn close(mut self) -> StoreResult<()> {
        self.rollback().await?;
        self.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }
}
