//! Graph nodes and display handles.

use serde::{Deserialize, Serialize};
use sylva_core::{Document, NodeKind};

/// Session-unique number given to a node once it is displayed.
///
/// Cheap to copy and hash, so navigation history is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(pub u64);

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out handles from a single increasing counter.
///
/// One allocator lives for the whole exploration session and is never
/// rewound, so a handle is never given to two nodes.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    /// Creates an allocator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused handle.
    pub fn allocate(&mut self) -> Handle {
        let handle = Handle(self.next);
        self.next += 1;
        handle
    }

    /// How many handles have been given out so far.
    pub fn allocated(&self) -> u64 {
        self.next
    }
}

/// A document in the graph.
///
/// Identity is the path. Adjacency (`neighbors`, link positions, degrees)
/// is owned by the containing [`Graph`](crate::Graph) and rebuilt whenever
/// its indexes are, so it is read-only from outside the crate. `state` is
/// free-form consumer data the engine carries along but never reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: String,

    /// Display name.
    pub name: String,

    /// Note, attachment or section.
    pub kind: NodeKind,

    pub(crate) handle: Option<Handle>,

    pub(crate) neighbors: Vec<String>,

    #[serde(skip)]
    pub(crate) links: Vec<usize>,

    pub(crate) in_degree: usize,
    pub(crate) out_degree: usize,
    pub(crate) expanded: bool,
    pub(crate) imploded: bool,

    /// Consumer-owned state (selection, labels...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub state: serde_json::Map<String, serde_json::Value>,
}

impl Node {
    /// Creates a bare node.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            handle: None,
            neighbors: Vec::new(),
            links: Vec::new(),
            in_degree: 0,
            out_degree: 0,
            expanded: false,
            imploded: false,
            state: serde_json::Map::new(),
        }
    }

    /// The node's path.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display handle, if the node has been displayed.
    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    /// Paths of nodes linked to or from this one, each listed once.
    pub fn neighbors(&self) -> &[String] {
        &self.neighbors
    }

    /// Positions of every link touching this node, in link order.
    pub fn link_positions(&self) -> &[usize] {
        &self.links
    }

    /// Number of links pointing at this node.
    pub fn in_degree(&self) -> usize {
        self.in_degree
    }

    /// Number of links leaving this node.
    pub fn out_degree(&self) -> usize {
        self.out_degree
    }

    /// True once the node's neighborhood has been merged into the display.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// True once the node's sections have been added as sub-nodes.
    pub fn is_imploded(&self) -> bool {
        self.imploded
    }

    /// True if no link touches this node.
    pub fn is_orphan(&self) -> bool {
        self.links.is_empty()
    }

    pub(crate) fn clear_adjacency(&mut self) {
        self.neighbors.clear();
        self.links.clear();
        self.in_degree = 0;
        self.out_degree = 0;
    }

    pub(crate) fn add_neighbor(&mut self, id: &str) {
        if !self.neighbors.iter().any(|n| n == id) {
            self.neighbors.push(id.to_string());
        }
    }
}

impl From<&Document> for Node {
    fn from(doc: &Document) -> Self {
        Node::new(doc.path.clone(), doc.name.clone(), doc.kind)
    }
}
