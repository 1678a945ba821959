//! Directed links between documents.

use crate::node::Node;
use serde::{Deserialize, Serialize};

/// A directed link in the graph.
///
/// Endpoints are node paths, resolved through the owning graph's index.
/// `label` and `distance` are display fields: the engine may fill them in
/// but never reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub(crate) source: String,
    pub(crate) target: String,

    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Hop distance from the traversal center, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<usize>,
}

impl Link {
    /// Creates a link from `source` to `target`.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
            distance: None,
        }
    }

    /// Path of the linking node.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Path of the linked node.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether `id` is either endpoint.
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    /// The endpoint opposite `id`.
    pub fn other_end(&self, id: &str) -> &str {
        if self.source == id {
            &self.target
        } else {
            &self.source
        }
    }
}

/// A serializable view of a graph for export/visualization.
#[derive(Debug, Serialize)]
pub struct GraphExport<'a> {
    pub nodes: &'a [Node],
    pub links: &'a [Link],
}

/// Graph statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub link_count: usize,
    pub orphan_count: usize,
    pub attachment_count: usize,
}
