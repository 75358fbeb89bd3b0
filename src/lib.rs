//! Sitemap-Sync: keeps a table of listing URLs in step with a site's sitemap
//!
//! This crate walks a (gzip-compressed) XML sitemap hierarchy starting from a
//! single sitemap-index URL, collects every leaf listing URL into a
//! deduplicated set, writes a dated audit snapshot of that set, and then
//! replaces the persisted table of active URLs with it.

pub mod config;
pub mod crawler;
pub mod output;
pub mod pipeline;
pub mod state;
pub mod storage;

use std::fmt;
use thiserror::Error;

/// Phases of a sync run, used to classify fatal errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Config,
    Resolve,
    Export,
    Replace,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Config => "config",
            Self::Resolve => "resolve",
            Self::Export => "export",
            Self::Replace => "replace",
        };
        f.write_str(name)
    }
}

/// Main error type for a sync run
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resolve phase failed: {0}")]
    Resolve(#[from] crawler::ResolveError),

    #[error("Resolve phase found no URLs under {root}; refusing to replace the active table")]
    EmptyResult { root: String },

    #[error("Export phase failed: {0}")]
    Export(#[from] output::ExportError),

    #[error("Replace phase failed: {0}")]
    Replace(#[from] storage::ReplaceError),

    #[error("Store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Run cancelled during the {phase} phase")]
    Cancelled { phase: Phase },
}

impl SyncError {
    /// Returns the phase the run was in when this error occurred
    pub fn phase(&self) -> Phase {
        match self {
            Self::Config(_) => Phase::Config,
            Self::Resolve(_) | Self::EmptyResult { .. } => Phase::Resolve,
            Self::Export(_) => Phase::Export,
            Self::Replace(_) | Self::Store(_) => Phase::Replace,
            Self::Cancelled { phase } => *phase,
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        if matches!(self, Self::Cancelled { .. }) {
            return 130;
        }
        match self.phase() {
            Phase::Config => 1,
            Phase::Resolve => 2,
            Phase::Export => 3,
            Phase::Replace => 4,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Store backend '{0}' is not available in this build")]
    BackendUnavailable(String),
}

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use pipeline::{run, run_until, RunOptions, SyncSummary};
pub use state::{DiscoveredSet, ResolveReport, ResolveWarning};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Resolve.to_string(), "resolve");
        assert_eq!(Phase::Replace.to_string(), "replace");
    }

    #[test]
    fn test_exit_codes_follow_phase() {
        let empty = SyncError::EmptyResult {
            root: "https://example.com/sitemap.xml.gz".to_string(),
        };
        assert_eq!(empty.phase(), Phase::Resolve);
        assert_eq!(empty.exit_code(), 2);

        let cancelled = SyncError::Cancelled {
            phase: Phase::Resolve,
        };
        assert_eq!(cancelled.exit_code(), 130);

        let config = SyncError::Config(ConfigError::Validation("bad".to_string()));
        assert_eq!(config.exit_code(), 1);
    }
}
