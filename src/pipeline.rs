//! Resolve → export → replace orchestration
//!
//! Only the resolve phase can be cancelled. Once the snapshot export has
//! started, the run continues through the replacement so that no store
//! transaction is torn down half way.

use crate::config::{Config, StoreBackend};
use crate::crawler::{self, Resolution};
use crate::output::export_snapshot;
use crate::state::ResolveReport;
use crate::storage::{count_active_rows, ReplaceOptions, ReplaceReport, SqliteStore, StoreReplacer};
use crate::{DiscoveredSet, Phase, Result, SyncError};
use chrono::{Local, NaiveDate};
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Per-run switches that are not part of the configuration file
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop after the snapshot export
    pub skip_replace: bool,

    /// Date the snapshot is named after; today when unset
    pub snapshot_date: Option<NaiveDate>,
}

impl RunOptions {
    fn snapshot_date(&self) -> NaiveDate {
        self.snapshot_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

/// What a completed run did
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub root_url: String,
    pub urls: usize,
    pub report: ResolveReport,
    pub snapshot: PathBuf,
    /// `None` when the replacement was skipped
    pub replace: Option<ReplaceReport>,
    pub elapsed: Duration,
}

/// Runs a complete sync without external cancellation
pub async fn run(config: Config, skip_replace: bool) -> Result<SyncSummary> {
    let options = RunOptions {
        skip_replace,
        ..RunOptions::default()
    };
    run_until(config, options, std::future::pending()).await
}

/// Runs a complete sync, abandoning the resolve phase if `shutdown` completes first
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `options` - Per-run switches
/// * `shutdown` - Future that completes when the run should stop
///
/// # Returns
///
/// * `Ok(SyncSummary)` - The run completed
/// * `Err(SyncError)` - The failing phase and its cause
pub async fn run_until<F>(config: Config, options: RunOptions, shutdown: F) -> Result<SyncSummary>
where
    F: Future<Output = ()>,
{
    let started = Instant::now();
    let root_url = config.sitemap.root_url.clone();

    let Resolution { urls, report } = tokio::select! {
        result = crawler::resolve(&config) => result?,
        _ = shutdown => {
            tracing::warn!("Shutdown requested; abandoning the resolve phase");
            return Err(SyncError::Cancelled { phase: Phase::Resolve });
        }
    };

    if urls.is_empty() && !config.store.allow_empty {
        return Err(SyncError::EmptyResult { root: root_url });
    }

    let snapshot = export_snapshot(
        &urls,
        &config.export.directory,
        &config.export.file_prefix,
        options.snapshot_date(),
    )?;

    let url_count = urls.len();
    let replace = if options.skip_replace {
        tracing::info!("Skipping replacement of {}", config.store.table);
        None
    } else {
        Some(replace_active_table(&config, urls).await?)
    };

    Ok(SyncSummary {
        root_url,
        urls: url_count,
        report,
        snapshot,
        replace,
        elapsed: started.elapsed(),
    })
}

/// Replaces the configured active table with `urls`
pub async fn replace_active_table(config: &Config, urls: DiscoveredSet) -> Result<ReplaceReport> {
    let options = ReplaceOptions::from_config(&config.store);

    match config.store.backend {
        StoreBackend::Sqlite => {
            let store = SqliteStore::new(config.store.sqlite_path.clone());
            Ok(StoreReplacer::new(store, options).replace(urls).await?)
        }
        #[cfg(feature = "postgres")]
        StoreBackend::Postgres => {
            let store = postgres_store(config);
            Ok(StoreReplacer::new(store, options).replace(urls).await?)
        }
        #[cfg(not(feature = "postgres"))]
        StoreBackend::Postgres => Err(postgres_unavailable()),
    }
}

/// Row count of the configured active table
pub async fn active_row_count(config: &Config) -> Result<u64> {
    let table = &config.store.table;
    match config.store.backend {
        StoreBackend::Sqlite => {
            let store = SqliteStore::new(config.store.sqlite_path.clone());
            Ok(count_active_rows(&store, table).await?)
        }
        #[cfg(feature = "postgres")]
        StoreBackend::Postgres => {
            let store = postgres_store(config);
            Ok(count_active_rows(&store, table).await?)
        }
        #[cfg(not(feature = "postgres"))]
        StoreBackend::Postgres => Err(postgres_unavailable()),
    }
}

#[cfg(feature = "postgres")]
fn postgres_store(config: &Config) -> crate::storage::PostgresStore {
    crate::storage::PostgresStore::new(
        crate::config::StoreCredentials::from_env(),
        config.store.database.clone(),
    )
}

#[cfg(not(feature = "postgres"))]
fn postgres_unavailable() -> SyncError {
    SyncError::Config(crate::ConfigError::BackendUnavailable(
        StoreBackend::Postgres.to_string(),
    ))
}
