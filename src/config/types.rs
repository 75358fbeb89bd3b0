use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Root sitemap of the apartments.com listing profiles
pub const DEFAULT_ROOT_URL: &str = "https://www.apartments.com/sitemap_AllProfiles.xml.gz";

/// Main configuration structure for Sitemap-Sync
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sitemap: SitemapConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Sitemap traversal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Root sitemap-index URL the traversal starts from
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Directory under which each run stages its downloads
    #[serde(rename = "scratch-dir")]
    pub scratch_dir: PathBuf,

    /// Deepest index nesting followed below the root
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            scratch_dir: PathBuf::from("temp"),
            max_depth: 16,
            request_timeout_secs: 30,
        }
    }
}

impl SitemapConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "sitemap-sync".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "ops@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Snapshot export configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory the dated snapshot files are written to
    pub directory: PathBuf,

    /// File name prefix; the date and `.csv` are appended
    #[serde(rename = "file-prefix")]
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_prefix: "Apt_active_ids_".to_string(),
        }
    }
}

/// Which database engine holds the active table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Postgres,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => f.write_str("sqlite"),
            Self::Postgres => f.write_str("postgres"),
        }
    }
}

/// How the active table is replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplaceStrategy {
    /// Load a staging table, then rename it over the active table in one transaction
    Swap,
    /// Drop the active table, recreate it empty, then load it
    DropRecreate,
}

impl fmt::Display for ReplaceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Swap => f.write_str("swap"),
            Self::DropRecreate => f.write_str("drop-recreate"),
        }
    }
}

/// Persistent store configuration
///
/// Credentials are deliberately absent; see [`super::StoreCredentials`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// SQLite database file (sqlite backend only)
    #[serde(rename = "sqlite-path")]
    pub sqlite_path: PathBuf,

    /// Database name (postgres backend only)
    pub database: String,

    /// Name of the active table
    pub table: String,

    pub strategy: ReplaceStrategy,

    /// Rows per INSERT round trip
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Rows inserted between intermediate commits
    #[serde(rename = "commit-every")]
    pub commit_every: usize,

    /// Pause before the single reconnect attempt (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Allow replacing the active table with an empty set
    #[serde(rename = "allow-empty")]
    pub allow_empty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            sqlite_path: PathBuf::from("apt_active_ids.db"),
            database: "postgres".to_string(),
            table: "apt_active_ids".to_string(),
            strategy: ReplaceStrategy::Swap,
            batch_size: 200,
            commit_every: 100_000,
            retry_delay_ms: 1000,
            allow_empty: false,
        }
    }
}

impl StoreConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
