//! PostgreSQL storage implementation
//!
//! ## Configuration
//!
//! Connection parameters come from [`StoreCredentials`] (host, user and
//! password, read from the environment) plus the configured database name.
//! A missing credential is reported when connecting, not when loading the
//! configuration.

use crate::config::StoreCredentials;
use crate::storage::schema::{count_rows_sql, insert_batch_sql};
use crate::storage::traits::{StoreConnection, StoreError, StoreResult, UrlStore};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;

/// PostgreSQL store
#[derive(Debug, Clone)]
pub struct PostgresStore {
    credentials: StoreCredentials,
    database: String,
}

impl PostgresStore {
    pub fn new(credentials: StoreCredentials, database: impl Into<String>) -> Self {
        Self {
            credentials,
            database: database.into(),
        }
    }

    fn connect_options(&self) -> StoreResult<PgConnectOptions> {
        let missing = self.credentials.missing();
        if !missing.is_empty() {
            return Err(StoreError::MissingCredential(missing));
        }

        let mut options = PgConnectOptions::new().database(&self.database);
        if let Some(host) = &self.credentials.host {
            options = options.host(host);
        }
        if let Some(user) = &self.credentials.user {
            options = options.username(user);
        }
        if let Some(password) = &self.credentials.password {
            options = options.password(password);
        }
        Ok(options)
    }
}

#[async_trait]
impl UrlStore for PostgresStore {
    type Connection = PostgresConnection;

    async fn connect(&self) -> StoreResult<PostgresConnection> {
        let options = self.connect_options()?;
        let conn = PgConnection::connect_with(&options).await?;
        Ok(PostgresConnection {
            conn,
            in_transaction: false,
        })
    }

    fn describe(&self) -> String {
        format!(
            "postgres://{}/{}",
            self.credentials.host.as_deref().unwrap_or("<unset>"),
            self.database
        )
    }
}

/// An open PostgreSQL connection with an implicit transaction
pub struct PostgresConnection {
    conn: PgConnection,
    in_transaction: bool,
}

impl PostgresConnection {
    async fn begin_if_needed(&mut self) -> StoreResult<()> {
        if !self.in_transaction {
            sqlx::query("BEGIN").execute(&mut self.conn).await?;
            self.in_transaction = true;
        }
        Ok(())
    }
}

#[async_trait]
impl StoreConnection for PostgresConnection {
    async fn execute(&mut self, sql: &str) -> StoreResult<()> {
        self.begin_if_needed().await?;
        sqlx::query(sql).execute(&mut self.conn).await?;
        Ok(())
    }

    async fn insert_batch(&mut self, table: &str, urls: &[String]) -> StoreResult<u64> {
        if urls.is_empty() {
            return Ok(0);
        }
        self.begin_if_needed().await?;

        let sql = insert_batch_sql(table, urls.len(), |n| format!("${}", n));
        let mut query = sqlx::query(&sql);
        for url in urls {
            query = query.bind(url.as_str());
        }
        let result = query.execute(&mut self.conn).await?;
        Ok(result.rows_affected())
    }

    async fn commit(&mut self) -> StoreResult<()> {
        if self.in_transaction {
            sqlx::query("COMMIT").execute(&mut self.conn).await?;
            self.in_transaction = false;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        if self.in_transaction {
            self.in_transaction = false;
            sqlx::query("ROLLBACK").execute(&mut self.conn).await?;
        }
        Ok(())
    }

    async fn count_rows(&mut self, table: &str) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(&count_rows_sql(table))
            .fetch_one(&mut self.conn)
            .await?;
        Ok(count as u64)
    }

    async fn close(mut self) -> StoreResult<()> {
        self.rollback().await?;
        self.conn.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credentials_fail_before_connecting() {
        let credentials = StoreCredentials {
            host: Some("localhost".to_string()),
            user: None,
            password: None,
        };
        let store = PostgresStore::new(credentials, "postgres");

        match store.connect().await {
            Err(StoreError::MissingCredential(missing)) => {
                assert_eq!(missing.len(), 2);
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("connected without credentials"),
        }
    }

    #[test]
    fn test_describe_omits_password() {
        let credentials = StoreCredentials {
            host: Some("db.internal".to_string()),
            user: Some("sync".to_string()),
            password: Some("hunter2".to_string()),
        };
        let store = PostgresStore::new(credentials, "listings");
        assert_eq!(store.describe(), "postgres://db.internal/listings");
    }
}
