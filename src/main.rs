//! Sitemap-Sync main entry point
//!
//! This is the command-line interface for the sitemap synchroniser.

use clap::Parser;
use sitemap_sync::config::{load_config_with_hash, validate, Config, StoreBackend};
use sitemap_sync::output::print_summary;
use sitemap_sync::pipeline::active_row_count;
use sitemap_sync::{run_until, ConfigError, RunOptions, SyncError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Sitemap-Sync: keeps a table of listing URLs in step with a sitemap
///
/// Sitemap-Sync walks a gzip-compressed XML sitemap hierarchy, writes a
/// dated CSV snapshot of every listing URL it finds, and atomically
/// replaces the active URL table with the fresh set.
#[derive(Parser, Debug)]
#[command(name = "sitemap-sync")]
#[command(version = "1.0.0")]
#[command(about = "Sync a table of listing URLs from an XML sitemap tree", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Root sitemap URL, overriding the configuration
    #[arg(long, value_name = "URL")]
    root_url: Option<String>,

    /// Resolve and export the snapshot, but leave the active table untouched
    #[arg(long)]
    skip_replace: bool,

    /// Validate config and show the effective settings without running
    #[arg(long, conflicts_with_all = ["stats", "skip_replace"])]
    dry_run: bool,

    /// Show the active table's row count and exit
    #[arg(long, conflicts_with_all = ["dry_run", "skip_replace"])]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => return report_failure(&SyncError::Config(e)),
    };

    let result = if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.stats {
        handle_stats(&config).await
    } else {
        handle_sync(config, cli.skip_replace, cli.quiet).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_sync=info,warn"),
            1 => EnvFilter::new("sitemap_sync=debug,info"),
            2 => EnvFilter::new("sitemap_sync=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (or defaults) and applies CLI overrides
fn load(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given; using built-in defaults");
            Config::default()
        }
    };

    if let Some(root_url) = &cli.root_url {
        config.sitemap.root_url = root_url.clone();
    }

    validate(&config)?;
    Ok(config)
}

/// Logs a fatal error with its phase and maps it to an exit status
fn report_failure(error: &SyncError) -> ExitCode {
    tracing::error!("{} phase failed: {}", error.phase(), error);

    if let SyncError::Replace(replace) = error {
        tracing::error!(
            "Failed step: {}; active table is {}",
            replace.step(),
            replace.table_state()
        );
    }

    ExitCode::from(error.exit_code())
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sitemap-Sync Dry Run ===\n");

    println!("Sitemap:");
    println!("  Root URL: {}", config.sitemap.root_url);
    println!("  Scratch directory: {}", config.sitemap.scratch_dir.display());
    println!("  Max depth: {}", config.sitemap.max_depth);
    println!("  Request timeout: {}s", config.sitemap.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nExport:");
    println!("  Directory: {}", config.export.directory.display());
    println!("  File prefix: {}", config.export.file_prefix);

    println!("\nStore:");
    println!("  Backend: {}", config.store.backend);
    match config.store.backend {
        StoreBackend::Sqlite => println!("  Database file: {}", config.store.sqlite_path.display()),
        StoreBackend::Postgres => println!("  Database: {}", config.store.database),
    }
    println!("  Table: {}", config.store.table);
    println!("  Strategy: {}", config.store.strategy);
    println!(
        "  Batch size: {} (commit every {} rows)",
        config.store.batch_size, config.store.commit_every
    );
    println!("  Allow empty result: {}", config.store.allow_empty);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows the active table's row count
async fn handle_stats(config: &Config) -> Result<(), SyncError> {
    let rows = active_row_count(config).await?;
    println!("{}: {} rows", config.store.table, rows);
    Ok(())
}

/// Handles the main sync operation
async fn handle_sync(config: Config, skip_replace: bool, quiet: bool) -> Result<(), SyncError> {
    tracing::info!(
        "Starting sync from {} into {} ({})",
        config.sitemap.root_url,
        config.store.table,
        config.store.backend
    );

    let options = RunOptions {
        skip_replace,
        ..RunOptions::default()
    };

    let summary = run_until(config, options, shutdown_signal()).await?;
    tracing::info!("Sync completed successfully");

    if !quiet {
        print_summary(&summary);
    }
    Ok(())
}

/// Completes on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, stopping"),
        _ = terminate => tracing::info!("Received SIGTERM, stopping"),
    }
}
