//! Sitemap XML parser
//!
//! This module classifies a decoded sitemap document and extracts its
//! `<loc>` entries:
//! - `<sitemapindex>` roots yield the `<sitemap><loc>` child sitemap URLs
//! - `<urlset>` roots yield the `<url><loc>` page URLs
//! - anything else is reported as unrecognized

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Depth of a `<loc>` element below the document root: root > entry > loc
const LOC_DEPTH: usize = 3;

/// Classification of a parsed sitemap document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A sitemap index whose entries point at further sitemaps
    Index,
    /// A URL set whose entries are leaf page URLs
    UrlSet,
    /// Any other top-level shape
    Unrecognized,
}

impl NodeKind {
    fn from_root(name: &str) -> Self {
        match name {
            "sitemapindex" => Self::Index,
            "urlset" => Self::UrlSet,
            _ => Self::Unrecognized,
        }
    }

    /// Name of the element wrapping each `<loc>` in this kind of document
    fn entry_element(&self) -> Option<&'static str> {
        match self {
            Self::Index => Some("sitemap"),
            Self::UrlSet => Some("url"),
            Self::Unrecognized => None,
        }
    }
}

/// One parsed sitemap document
///
/// Locations keep document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapNode {
    Index(Vec<String>),
    UrlSet(Vec<String>),
    Unrecognized { root_element: Option<String> },
}

impl SitemapNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Index(_) => NodeKind::Index,
            Self::UrlSet(_) => NodeKind::UrlSet,
            Self::Unrecognized { .. } => NodeKind::Unrecognized,
        }
    }

    /// Child sitemap URLs (index) or page URLs (URL set)
    pub fn locations(&self) -> &[String] {
        match self {
            Self::Index(locs) | Self::UrlSet(locs) => locs,
            Self::Unrecognized { .. } => &[],
        }
    }

    fn with_locations(kind: NodeKind, locations: Vec<String>) -> Self {
        match kind {
            NodeKind::Index => Self::Index(locations),
            NodeKind::UrlSet => Self::UrlSet(locations),
            NodeKind::Unrecognized => Self::Unrecognized { root_element: None },
        }
    }
}

/// Errors that can occur while parsing sitemap XML
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed sitemap XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Sitemap XML ended before </{0}>")]
    Truncated(String),
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Parses raw sitemap XML into a [`SitemapNode`]
///
/// Namespace prefixes are ignored when classifying elements. Only a `<loc>`
/// directly inside a `<sitemap>` or `<url>` entry counts, so extension
/// elements such as `<image:loc>` are skipped.
///
/// # Example
///
/// ```
/// use sitemap_sync::crawler::{parse_sitemap, NodeKind};
///
/// let xml = br#"<urlset><url><loc>https://example.com/a</loc></url></urlset>"#;
/// let node = parse_sitemap(xml).unwrap();
/// assert_eq!(node.kind(), NodeKind::UrlSet);
/// assert_eq!(node.locations(), &["https://example.com/a".to_string()]);
/// ```
pub fn parse_sitemap(xml: &[u8]) -> Result<SitemapNode, ParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut kind: Option<NodeKind> = None;
    let mut locations = Vec::new();
    let mut loc_text: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = local_name(e.local_name().as_ref());

                if stack.is_empty() {
                    let root_kind = NodeKind::from_root(&name);
                    if root_kind == NodeKind::Unrecognized {
                        return Ok(SitemapNode::Unrecognized {
                            root_element: Some(name),
                        });
                    }
                    kind = Some(root_kind);
                }

                stack.push(name);

                if loc_text.is_none() && is_loc_position(&stack, kind) {
                    loc_text = Some(String::new());
                }
            }
            Event::Empty(ref e) => {
                if stack.is_empty() {
                    let name = local_name(e.local_name().as_ref());
                    let root_kind = NodeKind::from_root(&name);
                    if root_kind == NodeKind::Unrecognized {
                        return Ok(SitemapNode::Unrecognized {
                            root_element: Some(name),
                        });
                    }
                    return Ok(SitemapNode::with_locations(root_kind, Vec::new()));
                }
            }
            Event::Text(ref e) => {
                if let Some(text) = loc_text.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(ref e) => {
                if let Some(text) = loc_text.as_mut() {
                    text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::End(_) => {
                if stack.len() == LOC_DEPTH {
                    if let Some(text) = loc_text.take() {
                        let trimmed = text.trim();
                        if !trimmed.is_empty() {
                            locations.push(trimmed.to_string());
                        }
                    }
                }

                stack.pop();
                if stack.is_empty() {
                    break;
                }
            }
            Event::Eof => {
                if let Some(open) = stack.last() {
                    return Err(ParseError::Truncated(open.clone()));
                }
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    match kind {
        Some(kind) => Ok(SitemapNode::with_locations(kind, locations)),
        None => Ok(SitemapNode::Unrecognized { root_element: None }),
    }
}

/// True when the innermost open element is a `<loc>` directly inside an entry
fn is_loc_position(stack: &[String], kind: Option<NodeKind>) -> bool {
    let entry = match kind.and_then(|k| k.entry_element()) {
        Some(entry) => entry,
        None => return false,
    };
    stack.len() == LOC_DEPTH && stack[1] == entry && stack[2] == "loc"
}
