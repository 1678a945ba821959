//! Bidirectional tag index.
//!
//! Two maps kept as mirror images: node -> tags and tag -> nodes. A tag is
//! listed for a node in one map exactly when the node is listed for the
//! tag in the other. Empty sets are pruned, so a missing key always means
//! "no data".

use std::collections::{BTreeSet, HashMap};
use tracing::debug;

static EMPTY: BTreeSet<String> = BTreeSet::new();

/// Normalizes a tag to its `#`-prefixed form.
pub fn normalize_tag(tag: &str) -> String {
    let trimmed = tag.trim();
    if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("#{}", trimmed)
    }
}

/// Maps nodes to their tags and tags to their nodes.
///
/// Owned by the caller and passed explicitly to whatever needs it, so each
/// test can work on its own instance.
#[derive(Debug, Default, Clone)]
pub struct TagIndex {
    node_to_tags: HashMap<String, BTreeSet<String>>,
    tag_to_nodes: HashMap<String, BTreeSet<String>>,
}

impl TagIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the full tag set of a node, replacing whatever was there.
    ///
    /// An empty tag list is a no-op.
    pub fn add_tags<I, S>(&mut self, node: &str, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags: BTreeSet<String> = tags
            .into_iter()
            .map(|t| normalize_tag(t.as_ref()))
            .filter(|t| t.len() > 1)
            .collect();
        if tags.is_empty() {
            return;
        }

        self.remove_node(node);
        for tag in &tags {
            self.tag_to_nodes
                .entry(tag.clone())
                .or_default()
                .insert(node.to_string());
        }
        self.node_to_tags.insert(node.to_string(), tags);
    }

    /// Adds or removes one tag on a node that is already indexed.
    ///
    /// Nodes whose full tag set was never loaded are left alone, so a late
    /// single edit cannot create a half-populated entry.
    pub fn update_tag(&mut self, node: &str, tag: &str, add: bool) {
        let Some(tags) = self.node_to_tags.get_mut(node) else {
            debug!("Ignoring tag update for unindexed node {}", node);
            return;
        };
        let tag = normalize_tag(tag);
        if tag.len() <= 1 {
            return;
        }

        if add {
            if tags.insert(tag.clone()) {
                self.tag_to_nodes
                    .entry(tag)
                    .or_default()
                    .insert(node.to_string());
            }
            return;
        }

        if !tags.remove(&tag) {
            return;
        }
        if tags.is_empty() {
            self.node_to_tags.remove(node);
        }
        self.unlink(&tag, node);
    }

    /// Forgets everything about a node.
    pub fn remove_node(&mut self, node: &str) {
        if let Some(tags) = self.node_to_tags.remove(node) {
            for tag in &tags {
                self.unlink(tag, node);
            }
        }
    }

    fn unlink(&mut self, tag: &str, node: &str) {
        if let Some(nodes) = self.tag_to_nodes.get_mut(tag) {
            nodes.remove(node);
            if nodes.is_empty() {
                self.tag_to_nodes.remove(tag);
            }
        }
    }

    /// Tags of a node, empty if unknown.
    pub fn tags_for_node(&self, node: &str) -> &BTreeSet<String> {
        self.node_to_tags.get(node).unwrap_or(&EMPTY)
    }

    /// Nodes carrying a tag, empty if unknown.
    pub fn nodes_for_tag(&self, tag: &str) -> &BTreeSet<String> {
        self.tag_to_nodes
            .get(&normalize_tag(tag))
            .unwrap_or(&EMPTY)
    }

    /// Whether the node's tags have been loaded.
    pub fn has(&self, node: &str) -> bool {
        self.node_to_tags.contains_key(node)
    }

    /// Whether a node carries a tag.
    pub fn node_has_tag(&self, node: &str, tag: &str) -> bool {
        self.tags_for_node(node).contains(&normalize_tag(tag))
    }

    /// All known tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.tag_to_nodes.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Empties both maps.
    pub fn clear(&mut self) {
        self.node_to_tags.clear();
        self.tag_to_nodes.clear();
    }

    /// Returns the number of indexed nodes.
    pub fn len(&self) -> usize {
        self.node_to_tags.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.node_to_tags.is_empty()
    }

    #[cfg(test)]
    fn assert_mirrored(&self) {
        for (node, tags) in &self.node_to_tags {
            assert!(!tags.is_empty());
            for tag in tags {
                assert!(self.tag_to_nodes[tag].contains(node));
            }
        }
        for (tag, nodes) in &self.tag_to_nodes {
            assert!(!nodes.is_empty());
            for node in nodes {
                assert!(self.node_to_tags[node].contains(tag));
            }
        }
    }
}
