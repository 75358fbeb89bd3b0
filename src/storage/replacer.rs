//! Replacement of the active URL table
//!
//! Two strategies are supported:
//! - `swap` builds the new table under a staging name, bulk-loads it, then
//!   drops the old table and renames the staging table in one transaction.
//!   The active table is never absent to outside readers.
//! - `drop-recreate` drops and recreates the active table on one connection,
//!   then bulk-loads it on a second one. A failure after the drop leaves the
//!   table absent or partially loaded.
//!
//! Both load rows in sorted order, `batch_size` rows per `INSERT`, committing
//! whenever at least `commit_every` rows have been inserted since the last
//! commit and once more at the end.

use crate::config::{ReplaceStrategy, StoreConfig};
use crate::state::DiscoveredSet;
use crate::storage::schema::{
    create_table_sql, drop_table_sql, rename_table_sql, staging_table_name, validate_table_name,
};
use crate::storage::traits::{StoreConnection, StoreError, UrlStore};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Schema-changing steps of a replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStep {
    Drop,
    Create,
    Swap,
}

impl SchemaStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Create => "create",
            Self::Swap => "swap",
        }
    }
}

impl fmt::Display for SchemaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an outside reader sees of the active table after a failed replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveTableState {
    /// Unchanged from before the run
    Intact,
    /// Dropped and not recreated
    Absent,
    /// Recreated, holding none or only part of the new set
    Partial,
}

impl fmt::Display for ActiveTableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Intact => "intact",
            Self::Absent => "absent",
            Self::Partial => "partial",
        })
    }
}

/// Errors that abort a replacement
#[derive(Debug, Error)]
pub enum ReplaceError {
    #[error("Invalid replacement target: {0}")]
    Target(#[source] StoreError),

    #[error("Could not connect to {store} (active table {state}): {source}")]
    Connection {
        store: String,
        state: ActiveTableState,
        #[source]
        source: StoreError,
    },

    #[error("The {step} step failed (active table {state}): {source}")]
    Schema {
        step: SchemaStep,
        state: ActiveTableState,
        #[source]
        source: StoreError,
    },

    #[error("The load step failed after {rows_committed} committed rows (active table {state}): {source}")]
    Load {
        rows_committed: usize,
        state: ActiveTableState,
        #[source]
        source: StoreError,
    },
}

impl ReplaceError {
    /// Name of the step that failed
    pub fn step(&self) -> &'static str {
        match self {
            Self::Target(_) => "validate",
            Self::Connection { .. } => "connect",
            Self::Schema { step, .. } => step.as_str(),
            Self::Load { .. } => "load",
        }
    }

    pub fn table_state(&self) -> ActiveTableState {
        match self {
            Self::Target(_) => ActiveTableState::Intact,
            Self::Connection { state, .. }
            | Self::Schema { state, .. }
            | Self::Load { state, .. } => *state,
        }
    }
}

/// Settings for one replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOptions {
    pub table: String,
    pub strategy: ReplaceStrategy,
    pub batch_size: usize,
    pub commit_every: usize,
    pub retry_delay: Duration,
}

impl ReplaceOptions {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            table: config.table.clone(),
            strategy: config.strategy,
            batch_size: config.batch_size,
            commit_every: config.commit_every,
            retry_delay: config.retry_delay(),
        }
    }
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

/// Outcome of a successful replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceReport {
    pub strategy: ReplaceStrategy,
    pub table: String,
    pub rows: usize,
    pub batches: usize,
    /// Rows covered by each commit, in order; the last entry is the final commit
    pub commit_sizes: Vec<usize>,
}

struct LoadStats {
    batches: usize,
    commit_sizes: Vec<usize>,
}

struct LoadFailure {
    rows_committed: usize,
    source: StoreError,
}

/// Replaces the active table of a [`UrlStore`]
pub struct StoreReplacer<S> {
    store: S,
    options: ReplaceOptions,
}

impl<S: UrlStore> StoreReplacer<S> {
    pub fn new(store: S, options: ReplaceOptions) -> Self {
        Self { store, options }
    }

    /// Replaces the active table's contents with `urls`
    ///
    /// # Returns
    ///
    /// * `Ok(ReplaceReport)` - The table now holds exactly `urls`
    /// * `Err(ReplaceError)` - The failing step and the state it left the active table in
    pub async fn replace(&self, urls: DiscoveredSet) -> Result<ReplaceReport, ReplaceError> {
        validate_table_name(&self.options.table).map_err(ReplaceError::Target)?;

        let mut rows: Vec<String> = urls.into_iter().collect();
        rows.sort();

        tracing::info!(
            "Replacing {} in {} with {} URLs ({} strategy)",
            self.options.table,
            self.store.describe(),
            rows.len(),
            self.options.strategy
        );

        let stats = match self.options.strategy {
            ReplaceStrategy::Swap => self.replace_by_swap(&rows).await?,
            ReplaceStrategy::DropRecreate => self.replace_by_drop_recreate(&rows).await?,
        };

        tracing::info!(
            "Replaced {}: {} rows in {} batches, {} commits",
            self.options.table,
            rows.len(),
            stats.batches,
            stats.commit_sizes.len()
        );

        Ok(ReplaceReport {
            strategy: self.options.strategy,
            table: self.options.table.clone(),
            rows: rows.len(),
            batches: stats.batches,
            commit_sizes: stats.commit_sizes,
        })
    }

    async fn replace_by_swap(&self, rows: &[String]) -> Result<LoadStats, ReplaceError> {
        let table = &self.options.table;
        let staging = staging_table_name(table);
        let intact = ActiveTableState::Intact;

        let mut conn = self.connect_with_retry(intact).await?;

        run_schema_step(
            &mut conn,
            &[drop_table_sql(&staging), create_table_sql(&staging)],
            SchemaStep::Create,
            intact,
        )
        .await?;

        let stats = match self.bulk_load(&mut conn, &staging, rows).await {
            Ok(stats) => stats,
            Err(failure) => {
                discard_staging(&mut conn, &staging).await;
                return Err(ReplaceError::Load {
                    rows_committed: failure.rows_committed,
                    state: intact,
                    source: failure.source,
                });
            }
        };

        run_schema_step(
            &mut conn,
            &[drop_table_sql(table), rename_table_sql(&staging, table)],
            SchemaStep::Swap,
            intact,
        )
        .await?;

        close_quietly(conn).await;
        Ok(stats)
    }

    async fn replace_by_drop_recreate(&self, rows: &[String]) -> Result<LoadStats, ReplaceError> {
        let table = &self.options.table;

        let mut conn = self.connect_with_retry(ActiveTableState::Intact).await?;
        run_schema_step(
            &mut conn,
            &[drop_table_sql(table)],
            SchemaStep::Drop,
            ActiveTableState::Intact,
        )
        .await?;
        run_schema_step(
            &mut conn,
            &[create_table_sql(table)],
            SchemaStep::Create,
            ActiveTableState::Absent,
        )
        .await?;
        close_quietly(conn).await;

        let mut conn = self.connect_with_retry(ActiveTableState::Partial).await?;
        let stats = self
            .bulk_load(&mut conn, table, rows)
            .await
            .map_err(|failure| ReplaceError::Load {
                rows_committed: failure.rows_committed,
                state: ActiveTableState::Partial,
                source: failure.source,
            })?;
        close_quietly(conn).await;

        Ok(stats)
    }

    /// Connects, retrying exactly once after `retry_delay`
    async fn connect_with_retry(
        &self,
        state: ActiveTableState,
    ) -> Result<S::Connection, ReplaceError> {
        match self.store.connect().await {
            Ok(conn) => Ok(conn),
            Err(first) => {
                tracing::warn!(
                    "Connection to {} failed ({}); retrying in {:?}",
                    self.store.describe(),
                    first,
                    self.options.retry_delay
                );
                tokio::time::sleep(self.options.retry_delay).await;

                self.store
                    .connect()
                    .await
                    .map_err(|source| ReplaceError::Connection {
                        store: self.store.describe(),
                        state,
                        source,
                    })
            }
        }
    }

    async fn bulk_load(
        &self,
        conn: &mut S::Connection,
        table: &str,
        rows: &[String],
    ) -> Result<LoadStats, LoadFailure> {
        let mut batches = 0;
        let mut committed = 0;
        let mut since_commit = 0;
        let mut commit_sizes = Vec::new();

        for chunk in rows.chunks(self.options.batch_size) {
            conn.insert_batch(table, chunk)
                .await
                .map_err(|source| LoadFailure {
                    rows_committed: committed,
                    source,
                })?;
            batches += 1;
            since_commit += chunk.len();
            tracing::debug!("Inserted batch {} ({} rows) into {}", batches, chunk.len(), table);

            if since_commit >= self.options.commit_every {
                conn.commit().await.map_err(|source| LoadFailure {
                    rows_committed: committed,
                    source,
                })?;
                committed += since_commit;
                commit_sizes.push(since_commit);
                since_commit = 0;
                tracing::info!(
                    "Committed {} rows into {}, {} remaining",
                    committed,
                    table,
                    rows.len() - committed
                );
            }
        }

        conn.commit().await.map_err(|source| LoadFailure {
            rows_committed: committed,
            source,
        })?;
        commit_sizes.push(since_commit);

        Ok(LoadStats {
            batches,
            commit_sizes,
        })
    }
}

/// Executes `statements` and commits them as one transaction
async fn run_schema_step<C: StoreConnection>(
    conn: &mut C,
    statements: &[String],
    step: SchemaStep,
    state: ActiveTableState,
) -> Result<(), ReplaceError> {
    let schema_err = |source| ReplaceError::Schema {
        step,
        state,
        source,
    };

    for sql in statements {
        tracing::debug!("{}: {}", step, sql);
        conn.execute(sql).await.map_err(schema_err)?;
    }
    conn.commit().await.map_err(schema_err)
}

/// Best-effort removal of a half-loaded staging table
async fn discard_staging<C: StoreConnection>(conn: &mut C, staging: &str) {
    let result = async {
        conn.rollback().await?;
        conn.execute(&drop_table_sql(staging)).await?;
        conn.commit().await
    }
    .await;

    if let Err(e) = result {
        tracing::warn!("Could not drop staging table {}: {}", staging, e);
    }
}

async fn close_quietly<C: StoreConnection>(conn: C) {
    if let Err(e) = conn.close().await {
        tracing::warn!("Error closing store connection: {}", e);
    }
}
