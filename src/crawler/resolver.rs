//! Recursive sitemap resolution
//!
//! The resolver walks the tree implied by sitemap-index → child edges depth
//! first, one node at a time, and unions every URL-set leaf into a single
//! [`DiscoveredSet`]. Failures below the root are recorded in the
//! [`ResolveReport`] and traversal moves on to the next sibling.

use super::fetcher::FetchError;
use super::loader::{NodeError, NodeLoader};
use super::parser::SitemapNode;
use crate::state::{DiscoveredSet, ResolveReport, ResolveWarning};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Default limit on index nesting below the root
pub const DEFAULT_MAX_DEPTH: u32 = 16;

/// Errors that abort a resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Root sitemap {url} could not be loaded: {source}")]
    Root {
        url: String,
        #[source]
        source: NodeError,
    },

    #[error("Every child of root sitemap {url} failed ({failed} attempted)")]
    AllChildrenFailed { url: String, failed: usize },

    #[error("Failed to prepare fetcher: {0}")]
    Setup(#[from] FetchError),
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub urls: DiscoveredSet,
    pub report: ResolveReport,
}

type VisitFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<DiscoveredSet>, NodeError>> + Send + 'a>>;

/// Depth-first resolver over a [`NodeLoader`]
pub struct Resolver<L> {
    loader: L,
    max_depth: u32,
}

impl<L: NodeLoader> Resolver<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Resolves `root` into the set of every leaf URL reachable from it
    ///
    /// Only a failure of the root node itself is an error. A root whose
    /// document is unrecognized resolves to an empty set with a warning.
    ///
    /// # Returns
    ///
    /// * `Ok(Resolution)` - Discovered URLs plus the traversal report
    /// * `Err(ResolveError)` - The root could not be loaded, or all of its children failed
    pub async fn resolve(&self, root: &str) -> Result<Resolution, ResolveError> {
        let mut visited = HashSet::new();
        visited.insert(root.to_string());
        let mut report = ResolveReport::default();

        tracing::info!("Resolving sitemap tree from {}", root);

        match self.visit(root, 0, &mut visited, &mut report).await {
            Ok(urls) => {
                let urls = urls.unwrap_or_default();
                tracing::info!(
                    "Resolved {} URLs from {} sitemaps ({} warnings)",
                    urls.len(),
                    report.nodes_loaded,
                    report.warning_count()
                );
                Ok(Resolution { urls, report })
            }
            Err(NodeError::AllChildrenFailed { attempted }) => Err(ResolveError::AllChildrenFailed {
                url: root.to_string(),
                failed: attempted,
            }),
            Err(source) => Err(ResolveError::Root {
                url: root.to_string(),
                source,
            }),
        }
    }

    /// Loads one node and, for an index, its subtree
    ///
    /// `Ok(None)` means the node was loaded but not recognized.
    fn visit<'a>(
        &'a self,
        url: &'a str,
        depth: u32,
        visited: &'a mut HashSet<String>,
        report: &'a mut ResolveReport,
    ) -> VisitFuture<'a> {
        Box::pin(async move {
            let node = self.loader.load(url).await?;
            report.nodes_loaded += 1;

            match node {
                SitemapNode::UrlSet(locations) => {
                    report.urlset_nodes += 1;
                    tracing::debug!("{}: {} URLs", url, locations.len());
                    Ok(Some(locations.into_iter().collect()))
                }
                SitemapNode::Unrecognized { root_element } => {
                    report.warn(ResolveWarning::Unrecognized {
                        url: url.to_string(),
                        root_element,
                    });
                    Ok(None)
                }
                SitemapNode::Index(children) => {
                    report.index_nodes += 1;
                    tracing::debug!("{}: index with {} children", url, children.len());

                    let mut urls = DiscoveredSet::new();
                    let mut attempted = 0;
                    let mut succeeded = 0;

                    for child in children {
                        let child_depth = depth + 1;
                        if child_depth > self.max_depth {
                            report.warn(ResolveWarning::DepthExceeded {
                                url: child,
                                depth: child_depth,
                            });
                            continue;
                        }
                        if !visited.insert(child.clone()) {
                            report.warn(ResolveWarning::Revisit { url: child });
                            continue;
                        }

                        attempted += 1;
                        match self.visit(&child, child_depth, visited, report).await {
                            Ok(Some(found)) => {
                                succeeded += 1;
                                urls.union(found);
                            }
                            Ok(None) => {}
                            Err(e) => report.warn(ResolveWarning::NodeFailed {
                                url: child.clone(),
                                error: e.to_string(),
                            }),
                        }
                    }

                    if attempted > 0 && succeeded == 0 {
                        return Err(NodeError::AllChildrenFailed { attempted });
                    }
                    Ok(Some(urls))
                }
            }
        })
    }
}
