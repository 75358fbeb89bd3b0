//! Non-fatal findings recorded while resolving a sitemap tree

use std::fmt;

/// A problem with one node that did not abort the traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// The node could not be fetched, decoded or parsed, or all of its children failed
    NodeFailed { url: String, error: String },

    /// The document's top-level element is neither a sitemap index nor a URL set
    Unrecognized {
        url: String,
        root_element: Option<String>,
    },

    /// The node was already visited in this traversal
    Revisit { url: String },

    /// The node lies deeper than the configured maximum depth
    DepthExceeded { url: String, depth: u32 },
}

impl ResolveWarning {
    /// The sitemap URL this warning is about
    pub fn url(&self) -> &str {
        match self {
            Self::NodeFailed { url, .. }
            | Self::Unrecognized { url, .. }
            | Self::Revisit { url }
            | Self::DepthExceeded { url, .. } => url,
        }
    }
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeFailed { url, error } => write!(f, "{}: {}", url, error),
            Self::Unrecognized {
                url,
                root_element: Some(root),
            } => write!(f, "{}: unrecognized sitemap root <{}>", url, root),
            Self::Unrecognized {
                url,
                root_element: None,
            } => write!(f, "{}: document has no root element", url),
            Self::Revisit { url } => write!(f, "{}: already visited, skipped", url),
            Self::DepthExceeded { url, depth } => {
                write!(f, "{}: depth {} exceeds the limit, skipped", url, depth)
            }
        }
    }
}

/// Counters and warnings gathered during one resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Nodes successfully fetched and parsed
    pub nodes_loaded: usize,

    /// Nodes classified as sitemap indexes
    pub index_nodes: usize,

    /// Nodes classified as URL sets
    pub urlset_nodes: usize,

    pub warnings: Vec<ResolveWarning>,
}

impl ResolveReport {
    pub fn warn(&mut self, warning: ResolveWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn failed_nodes(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, ResolveWarning::NodeFailed { .. }))
            .count()
    }
}
