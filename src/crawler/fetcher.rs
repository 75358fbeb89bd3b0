//! HTTP fetcher implementation
//!
//! This module downloads sitemap documents into a per-run scratch directory:
//! - Building the HTTP client with a proper user agent string
//! - GET requests staged byte-for-byte to disk
//! - Error classification (status, timeout, unreachable host)

use crate::config::UserAgentConfig;
use chrono::Local;
use reqwest::{redirect::Policy, Client};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use url::Url;

/// Errors that can occur while fetching a remote resource
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Host unreachable for {url}: {source}")]
    Unreachable { url: String, source: reqwest::Error },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl { url: String, source: url::ParseError },

    #[error("Failed to stage {url} at {}: {source}", .path.display())]
    Stage {
        url: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Builds an HTTP client with proper configuration
///
/// The client never decompresses response bodies on its own, so a staged
/// `.gz` file holds exactly the bytes the server sent.
///
/// # Example
///
/// ```no_run
/// use sitemap_sync::config::UserAgentConfig;
/// use sitemap_sync::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .build()
        .map_err(FetchError::Client)
}

/// Generates an identifier unique to this process and start time
pub fn run_id() -> String {
    format!(
        "run-{}-{}",
        Local::now().format("%Y%m%dT%H%M%S"),
        std::process::id()
    )
}

/// Scratch directory shared by every fetch of one run
///
/// The directory is created on first use and never cleaned up.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    created: OnceCell<()>,
}

impl ScratchDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            created: OnceCell::new(),
        }
    }

    /// A fresh run-scoped subdirectory of `base`
    pub fn for_run(base: &Path) -> Self {
        Self::new(base.join(run_id()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the directory if this is the first call, then returns its path
    pub async fn ensure(&self) -> std::io::Result<&Path> {
        self.created
            .get_or_try_init(|| async {
                tokio::fs::create_dir_all(&self.path).await?;
                tracing::debug!("Created scratch directory {}", self.path.display());
                Ok::<(), std::io::Error>(())
            })
            .await?;
        Ok(&self.path)
    }
}

/// Derives the staged file name from the URL's last non-empty path segment
pub fn staged_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("index")
        .to_string()
}

/// Downloads remote resources into a scratch directory
pub struct Fetcher {
    client: Client,
    scratch: ScratchDir,
}

impl Fetcher {
    pub fn new(client: Client, scratch: ScratchDir) -> Self {
        Self { client, scratch }
    }

    /// Fetches a URL and stages its body in the scratch directory
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the staged file
    /// * `Err(FetchError)` - Non-success status, timeout, unreachable host or write failure
    pub async fn fetch(&self, url: &str) -> Result<PathBuf, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let dir = self
            .scratch
            .ensure()
            .await
            .map_err(|source| FetchError::Stage {
                url: url.to_string(),
                path: self.scratch.path().to_path_buf(),
                source,
            })?;

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?;

        let path = dir.join(staged_file_name(&parsed));
        tokio::fs::write(&path, &body)
            .await
            .map_err(|source| FetchError::Stage {
                url: url.to_string(),
                path: path.clone(),
                source,
            })?;

        tracing::debug!("Fetched {} ({} bytes) -> {}", url, body.len(), path.display());
        Ok(path)
    }
}

/// Classifies a transport error
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Unreachable {
            url: url.to_string(),
            source: error,
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
