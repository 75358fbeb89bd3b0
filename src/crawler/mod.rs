//! Crawler module for sitemap discovery
//!
//! This module contains the sitemap traversal logic, including:
//! - HTTP fetching into a per-run scratch directory
//! - Gzip decoding of staged files
//! - Sitemap XML parsing and classification
//! - Recursive resolution of the sitemap tree

mod decoder;
mod fetcher;
mod loader;
mod parser;
mod resolver;

pub use decoder::{decode_file, decoded_path, DecodeError, GZIP_MAGIC};
pub use fetcher::{build_http_client, run_id, staged_file_name, FetchError, Fetcher, ScratchDir};
pub use loader::{HttpNodeLoader, NodeError, NodeLoader};
pub use parser::{parse_sitemap, NodeKind, ParseError, SitemapNode};
pub use resolver::{Resolution, ResolveError, Resolver, DEFAULT_MAX_DEPTH};

use crate::config::Config;

/// Builds an HTTP-backed resolver from configuration
///
/// Fetched files are staged under a fresh run-scoped subdirectory of
/// `sitemap.scratch-dir`.
pub fn build_resolver(config: &Config) -> Result<Resolver<HttpNodeLoader>, ResolveError> {
    let client = build_http_client(&config.user_agent, config.sitemap.request_timeout())?;
    let scratch = ScratchDir::for_run(&config.sitemap.scratch_dir);
    tracing::debug!("Scratch directory for this run: {}", scratch.path().display());

    let loader = HttpNodeLoader::new(Fetcher::new(client, scratch));
    Ok(Resolver::new(loader).with_max_depth(config.sitemap.max_depth))
}

/// Resolves the configured root sitemap
///
/// This is the main entry point for the resolve phase.
///
/// # Arguments
///
/// * `config` - The run configuration
///
/// # Returns
///
/// * `Ok(Resolution)` - Discovered URLs and the traversal report
/// * `Err(ResolveError)` - The root sitemap could not be resolved
pub async fn resolve(config: &Config) -> Result<Resolution, ResolveError> {
    build_resolver(config)?
        .resolve(&config.sitemap.root_url)
        .await
}
