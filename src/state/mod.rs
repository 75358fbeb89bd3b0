//! Traversal state
//!
//! This module holds the values a resolution produces: the deduplicated set
//! of discovered URLs and the report of non-fatal problems met on the way.

mod discovered;
mod report;

pub use discovered::DiscoveredSet;
pub use report::{ResolveReport, ResolveWarning};
