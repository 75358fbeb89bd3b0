//! Loading of one sitemap node
//!
//! A node load is the fetch → decode → parse cycle for a single URL. The
//! resolver only depends on the [`NodeLoader`] trait, so traversal can be
//! exercised without a network.

use super::decoder::{decode_file, DecodeError};
use super::fetcher::{FetchError, Fetcher};
use super::parser::{parse_sitemap, ParseError, SitemapNode};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Any failure to turn one sitemap URL into a [`SitemapNode`]
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("decode task failed: {0}")]
    Task(String),

    #[error("all {attempted} child sitemaps failed")]
    AllChildrenFailed { attempted: usize },
}

/// Produces parsed sitemap nodes from URLs
#[async_trait]
pub trait NodeLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<SitemapNode, NodeError>;
}

/// Loads nodes over HTTP(S), staging each body in the run's scratch directory
pub struct HttpNodeLoader {
    fetcher: Fetcher,
}

impl HttpNodeLoader {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl NodeLoader for HttpNodeLoader {
    async fn load(&self, url: &str) -> Result<SitemapNode, NodeError> {
        let staged = self.fetcher.fetch(url).await?;

        // Decompression and XML parsing are CPU bound
        tokio::task::spawn_blocking(move || decode_and_parse(staged))
            .await
            .map_err(|e| NodeError::Task(e.to_string()))?
    }
}

fn decode_and_parse(staged: PathBuf) -> Result<SitemapNode, NodeError> {
    let decoded = decode_file(&staged)?;
    let xml = std::fs::read(&decoded).map_err(|source| NodeError::Io {
        path: decoded.clone(),
        source,
    })?;
    Ok(parse_sitemap(&xml)?)
}
