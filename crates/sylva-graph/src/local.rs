//! Local graph requests.
//!
//! A local graph is the traversal result around a center node, with the
//! request's filters layered on top: attachments, a search query and
//! orphans. The filters never remove the center.

use crate::error::Result;
use crate::graph::Graph;
use crate::node::Node;
use crate::tags::{normalize_tag, TagIndex};
use crate::traversal::traverse;
use serde::{Deserialize, Serialize};
use sylva_core::{LinkDirection, NodeKind};
use tracing::debug;

/// How a local graph is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalGraphOptions {
    /// Maximum hops from the center.
    pub depth: usize,
    /// Which links to follow.
    pub link_type: LinkDirection,
    /// Keep nodes left without links after filtering.
    pub show_orphans: bool,
    /// Keep non-markdown files.
    pub show_attachments: bool,
    /// Only keep nodes matching this query; empty keeps everything.
    pub search_query: String,
}

impl Default for LocalGraphOptions {
    fn default() -> Self {
        Self {
            depth: 1,
            link_type: LinkDirection::Both,
            show_orphans: true,
            show_attachments: false,
            search_query: String::new(),
        }
    }
}

/// A parsed search query.
///
/// Deliberately simple: either a tag or a substring. There is no query
/// language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Matches every node.
    All,
    /// `tag:foo` or `#foo`: nodes carrying the tag.
    Tag(String),
    /// Case-insensitive substring of the path or display name.
    Text(String),
}

impl SearchQuery {
    /// Parses the raw query string.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::All;
        }
        if let Some(tag) = raw.strip_prefix("tag:") {
            return Self::Tag(normalize_tag(tag));
        }
        if raw.starts_with('#') {
            return Self::Tag(normalize_tag(raw));
        }
        Self::Text(raw.to_lowercase())
    }

    /// Whether `node` matches.
    pub fn matches(&self, node: &Node, tags: &TagIndex) -> bool {
        match self {
            Self::All => true,
            Self::Tag(tag) => tags.node_has_tag(node.id(), tag),
            Self::Text(text) => {
                node.id().to_lowercase().contains(text) || node.name.to_lowercase().contains(text)
            }
        }
    }
}

/// Builds the local graph around `center`.
///
/// Returns an empty graph when `center` is unknown. The tag index is only
/// consulted for tag queries.
pub fn local_graph(
    global: &Graph,
    center: &str,
    options: &LocalGraphOptions,
    tags: &TagIndex,
) -> Result<Graph> {
    let hood = traverse(global, center, options.depth, options.link_type);
    if hood.is_empty() {
        return Ok(Graph::new());
    }
    let graph = hood.into_graph()?;
    Ok(apply_options(&graph, center, options, tags))
}

/// Applies the attachment, search and orphan filters of `options`.
pub fn apply_options(
    graph: &Graph,
    center: &str,
    options: &LocalGraphOptions,
    tags: &TagIndex,
) -> Graph {
    let query = SearchQuery::parse(&options.search_query);

    let mut filtered = graph.filter(|node| {
        node.id() == center
            || ((options.show_attachments || node.kind != NodeKind::Attachment)
                && query.matches(node, tags))
    });

    if !options.show_orphans {
        filtered = filtered.filter(|node| node.id() == center || !node.is_orphan());
    }

    debug!(
        "Local graph for {}: {} -> {} nodes after filters",
        center,
        graph.node_count(),
        filtered.node_count()
    );
    filtered
}
