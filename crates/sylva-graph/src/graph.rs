//! Core graph data structure.
//!
//! A `Graph` is two dense arrays (nodes, links) plus the indexes that make
//! lookups O(1). Links and neighbor lists refer to nodes by path, never by
//! reference, so cloning is a flat copy and there are no ownership cycles.
//! Every operation that touches the arrays leaves the indexes in sync
//! before returning.

use crate::error::{GraphError, Result};
use crate::link::{GraphExport, GraphStats, Link};
use crate::node::{Handle, HandleAllocator, Node};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{HashMap, HashSet};
use sylva_core::{Document, LinkMap, NodeKind};
use tracing::debug;

/// Whether a graph is the full vault or something shown to the user.
///
/// Only displayed graphs carry handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphScope {
    /// The graph over every known document.
    Global,
    /// A local or expanded graph currently on screen.
    Displayed,
}

/// The document link graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    links: Vec<Link>,

    /// Node path -> position in `nodes`.
    node_index: HashMap<String, usize>,

    /// Source path -> target path -> position in `links`.
    link_index: HashMap<String, HashMap<String, usize>>,

    /// Handle -> position in `nodes`, for displayed graphs.
    handle_index: HashMap<Handle, usize>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from the host's link map.
    ///
    /// Node order follows `documents`; link order follows the map. Self
    /// links are skipped and a repeated (source, target) pair yields a
    /// single link. A link naming an unknown document is a structural
    /// error.
    pub fn from_link_map(link_map: &LinkMap, documents: &[Document]) -> Result<Self> {
        let nodes: Vec<Node> = documents.iter().map(Node::from).collect();

        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut links = Vec::new();
        for (source, targets) in link_map {
            for target in targets {
                if source == target {
                    continue;
                }
                if seen.insert((source.as_str(), target.as_str())) {
                    links.push(Link::new(source.clone(), target.clone()));
                }
            }
        }

        let graph = Self::from_parts(nodes, links)?;
        debug!(
            "Built graph: {} nodes, {} links",
            graph.node_count(),
            graph.link_count()
        );
        Ok(graph)
    }

    /// Assembles a graph from raw parts, validating every invariant.
    ///
    /// Adjacency carried on the incoming nodes is discarded and rebuilt.
    pub fn from_parts(nodes: Vec<Node>, links: Vec<Link>) -> Result<Self> {
        let mut graph = Self {
            nodes,
            links,
            ..Self::default()
        };
        graph.rebuild_indexes()?;
        Ok(graph)
    }

    /// Recomputes all indexes and node adjacency from the arrays.
    fn rebuild_indexes(&mut self) -> Result<()> {
        self.node_index.clear();
        self.link_index.clear();
        self.handle_index.clear();

        for (pos, node) in self.nodes.iter_mut().enumerate() {
            if self.node_index.insert(node.id.clone(), pos).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
            if let Some(handle) = node.handle {
                self.handle_index.insert(handle, pos);
            }
            node.clear_adjacency();
        }

        for pos in 0..self.links.len() {
            self.index_link(pos)?;
        }

        Ok(())
    }

    /// Registers the link at `pos` in the link index and wires both
    /// endpoints.
    fn index_link(&mut self, pos: usize) -> Result<()> {
        let link = &self.links[pos];

        let source_pos = self.resolve_endpoint(link, &link.source)?;
        let target_pos = self.resolve_endpoint(link, &link.target)?;

        let targets = self.link_index.entry(link.source.clone()).or_default();
        if targets.contains_key(&link.target) {
            return Err(GraphError::DuplicateLink {
                from: link.source.clone(),
                to: link.target.clone(),
            });
        }
        targets.insert(link.target.clone(), pos);

        let (source_id, target_id) = (link.source.clone(), link.target.clone());

        let source = &mut self.nodes[source_pos];
        source.out_degree += 1;
        source.links.push(pos);
        source.add_neighbor(&target_id);

        let target = &mut self.nodes[target_pos];
        target.in_degree += 1;
        if source_pos != target_pos {
            target.links.push(pos);
        }
        target.add_neighbor(&source_id);

        Ok(())
    }

    fn resolve_endpoint(&self, link: &Link, id: &str) -> Result<usize> {
        self.node_index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::DanglingLink {
                from: link.source.clone(),
                to: link.target.clone(),
                missing: id.to_string(),
            })
    }

    /// Appends a node, keeping the indexes in sync.
    ///
    /// Any adjacency the node carries is dropped; it gains links only
    /// through [`Graph::push_link`].
    pub fn push_node(&mut self, mut node: Node) -> Result<usize> {
        if self.node_index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        node.clear_adjacency();

        let pos = self.nodes.len();
        self.node_index.insert(node.id.clone(), pos);
        if let Some(handle) = node.handle {
            self.handle_index.insert(handle, pos);
        }
        self.nodes.push(node);
        Ok(pos)
    }

    /// Appends a link between two nodes already in the graph.
    pub fn push_link(&mut self, link: Link) -> Result<usize> {
        let pos = self.links.len();
        self.links.push(link);
        if let Err(err) = self.index_link(pos) {
            // index_link validates before it mutates, so popping restores
            // the previous state.
            self.links.pop();
            return Err(err);
        }
        Ok(pos)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────────────────────────────

    /// Gets a node by its path.
    pub fn node_by_path(&self, path: &str) -> Option<&Node> {
        let pos = self.node_index.get(path)?;
        self.nodes.get(*pos)
    }

    /// Gets a node by its display handle.
    pub fn node_by_handle(&self, handle: Handle) -> Option<&Node> {
        let pos = self.handle_index.get(&handle)?;
        self.nodes.get(*pos)
    }

    /// Gets a mutable node by its path.
    pub fn node_mut(&mut self, path: &str) -> Option<&mut Node> {
        let pos = self.node_index.get(path)?;
        self.nodes.get_mut(*pos)
    }

    /// Position of a node in [`Graph::nodes`].
    pub fn position(&self, path: &str) -> Option<usize> {
        self.node_index.get(path).copied()
    }

    /// Whether a node with this path is present.
    pub fn contains(&self, path: &str) -> bool {
        self.node_index.contains_key(path)
    }

    /// Gets the link from `source` to `target`.
    pub fn link(&self, source: &str, target: &str) -> Option<&Link> {
        let pos = self.link_index.get(source)?.get(target)?;
        self.links.get(*pos)
    }

    /// All links leaving `source`, in link order.
    pub fn links_from(&self, source: &str) -> Vec<&Link> {
        self.links_with(source)
            .into_iter()
            .filter(|link| link.source == source)
            .collect()
    }

    /// All links touching `path` in either direction, in link order.
    pub fn links_with(&self, path: &str) -> Vec<&Link> {
        self.node_by_path(path)
            .map(|node| {
                node.links
                    .iter()
                    .filter_map(|pos| self.links.get(*pos))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All links, in insertion order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// True if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Derivation
    // ─────────────────────────────────────────────────────────────────────

    /// Keeps the nodes passing `keep_node` and the links between them.
    pub fn filter<N>(&self, keep_node: N) -> Graph
    where
        N: Fn(&Node) -> bool,
    {
        self.filter_with_links(keep_node, |_| true)
    }

    /// Keeps the nodes passing `keep_node`, and the links whose endpoints
    /// both survive and which pass `keep_link`.
    ///
    /// # Panics
    ///
    /// Panics if the filtered graph is structurally inconsistent, which can
    /// only happen if this graph already was.
    pub fn filter_with_links<N, L>(&self, keep_node: N, keep_link: L) -> Graph
    where
        N: Fn(&Node) -> bool,
        L: Fn(&Link) -> bool,
    {
        let nodes: Vec<Node> = self.nodes.iter().filter(|n| keep_node(*n)).cloned().collect();
        let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

        let links: Vec<Link> = self
            .links
            .iter()
            .filter(|link| {
                kept.contains(link.source.as_str())
                    && kept.contains(link.target.as_str())
                    && keep_link(*link)
            })
            .cloned()
            .collect();

        match Graph::from_parts(nodes, links) {
            Ok(graph) => graph,
            Err(err) => panic!("filtering produced an inconsistent graph: {}", err),
        }
    }

    /// Structural equality: same node paths and same (source, target)
    /// pairs, ignoring order and per-node state.
    pub fn compare(a: &Graph, b: &Graph) -> bool {
        a.node_count() == b.node_count()
            && a.link_count() == b.link_count()
            && a.nodes.iter().all(|n| b.contains(&n.id))
            && a.links.iter().all(|l| b.link(&l.source, &l.target).is_some())
    }

    /// Shorthand for [`Graph::compare`].
    pub fn same_structure(&self, other: &Graph) -> bool {
        Graph::compare(self, other)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Display state
    // ─────────────────────────────────────────────────────────────────────

    /// Gives a fresh handle to every node that lacks one.
    ///
    /// Does nothing for global graphs.
    pub fn assign_handles(&mut self, scope: GraphScope, handles: &mut HandleAllocator) {
        if scope == GraphScope::Global {
            return;
        }
        for (pos, node) in self.nodes.iter_mut().enumerate() {
            if node.handle.is_none() {
                let handle = handles.allocate();
                node.handle = Some(handle);
                self.handle_index.insert(handle, pos);
            }
        }
    }

    /// Gives every node a handle for display after `previous`.
    ///
    /// Nodes whose path is already in `previous` take over its handle and
    /// consumer state; everything else gets a fresh handle.
    pub(crate) fn carry_over_display(&mut self, previous: &Graph, handles: &mut HandleAllocator) {
        self.handle_index.clear();
        for (pos, node) in self.nodes.iter_mut().enumerate() {
            let kept = previous.node_by_path(&node.id).and_then(|old| {
                let handle = old.handle?;
                node.state = old.state.clone();
                Some(handle)
            });
            let handle = kept.unwrap_or_else(|| handles.allocate());
            node.handle = Some(handle);
            self.handle_index.insert(handle, pos);
        }
    }

    /// Marks a node as expanded. Returns false if it is absent.
    pub fn set_expanded(&mut self, path: &str, expanded: bool) -> bool {
        match self.node_mut(path) {
            Some(node) => {
                node.expanded = expanded;
                true
            }
            None => false,
        }
    }

    /// Marks a node as imploded. Returns false if it is absent.
    pub fn set_imploded(&mut self, path: &str, imploded: bool) -> bool {
        match self.node_mut(path) {
            Some(node) => {
                node.imploded = imploded;
                true
            }
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────

    /// Builds an undirected petgraph view whose node indexes equal node
    /// positions.
    pub(crate) fn to_undirected(&self) -> UnGraph<(), ()> {
        let mut graph = UnGraph::with_capacity(self.nodes.len(), self.links.len());
        for _ in &self.nodes {
            graph.add_node(());
        }
        for link in &self.links {
            if let (Some(s), Some(t)) = (self.position(&link.source), self.position(&link.target))
            {
                graph.add_edge(NodeIndex::new(s), NodeIndex::new(t), ());
            }
        }
        graph
    }

    /// Returns a serializable view of the graph.
    pub fn export(&self) -> GraphExport<'_> {
        GraphExport {
            nodes: &self.nodes,
            links: &self.links,
        }
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            link_count: self.link_count(),
            orphan_count: self.nodes.iter().filter(|n| n.is_orphan()).count(),
            attachment_count: self
                .nodes
                .iter()
                .filter(|n| n.kind == NodeKind::Attachment)
                .count(),
        }
    }

    /// Checks that every index agrees with the arrays.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.node_index.len(), self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            assert_eq!(self.node_index.get(&node.id), Some(&i));
            if let Some(handle) = node.handle {
                assert_eq!(self.handle_index.get(&handle), Some(&i));
            }
            for pos in &node.links {
                let link = &self.links[*pos];
                assert!(link.touches(&node.id));
                assert!(node.neighbors.iter().any(|n| n == link.other_end(&node.id)));
            }
            for neighbor in &node.neighbors {
                assert!(
                    self.link(&node.id, neighbor).is_some() || self.link(neighbor, &node.id).is_some()
                );
            }
        }
        for (j, link) in self.links.iter().enumerate() {
            assert_eq!(
                self.link_index.get(&link.source).and_then(|t| t.get(&link.target)),
                Some(&j)
            );
        }
    }
}
