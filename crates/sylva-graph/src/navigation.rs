//! Navigation history for directional "pan" moves.
//!
//! When the selection moves from A to B, the shortest path between them in
//! the displayed graph is walked and every hop that follows a link's
//! direction is remembered as a parent/child pair. Stepping forward or
//! backward later replays those pairs, falling back to the first
//! structural child or parent when nothing was recorded.

use crate::graph::Graph;
use crate::node::{Handle, Node};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;
use tracing::debug;

/// Parent/child pointers keyed by node handle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NavigationHistory {
    backward: HashMap<Handle, Handle>,
    forward: HashMap<Handle, Handle>,
}

impl NavigationHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the selection moving from `from` to `to`.
    ///
    /// Must be called after the selection change, with the selection as it
    /// was before. Returns the number of parent/child pairs written.
    pub fn record_transition(&mut self, graph: &Graph, from: &str, to: &str) -> usize {
        let Some(path) = shortest_path(graph, from, to) else {
            debug!("No path from {} to {}, nothing recorded", from, to);
            return 0;
        };
        if path.len() <= 1 {
            return 0;
        }

        let mut written = 0;
        for pair in path.windows(2) {
            let (parent, child) = (pair[0], pair[1]);
            if graph.link(parent.id(), child.id()).is_none() {
                continue;
            }
            if let (Some(p), Some(c)) = (parent.handle(), child.handle()) {
                self.forward.insert(p, c);
                self.backward.insert(c, p);
                written += 1;
            }
        }

        debug!(
            "Recorded {} navigation steps from {} to {}",
            written, from, to
        );
        written
    }

    /// The recorded child of `handle`.
    pub fn forward(&self, handle: Handle) -> Option<Handle> {
        self.forward.get(&handle).copied()
    }

    /// The recorded parent of `handle`.
    pub fn backward(&self, handle: Handle) -> Option<Handle> {
        self.backward.get(&handle).copied()
    }

    /// Number of recorded forward pointers.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.backward.is_empty()
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.forward.clear();
        self.backward.clear();
    }
}

/// Shortest path between two nodes, ignoring link direction.
///
/// Unweighted and unbounded; the search stops as soon as `to` is reached.
/// Returns the nodes along the path, both ends included, or `None` if
/// either node is missing or they are not connected.
pub fn shortest_path<'g>(graph: &'g Graph, from: &str, to: &str) -> Option<Vec<&'g Node>> {
    let start = graph.position(from)?;
    let goal = graph.position(to)?;
    if start == goal {
        return graph.node_by_path(from).map(|node| vec![node]);
    }

    let view = graph.to_undirected();
    let goal_index = NodeIndex::new(goal);
    let (_cost, path) = petgraph::algo::astar(
        &view,
        NodeIndex::new(start),
        |finish| finish == goal_index,
        |_| 1, // every hop costs the same (BFS-like)
        |_| 0,
    )?;

    Some(
        path.into_iter()
            .filter_map(|idx| graph.nodes().get(idx.index()))
            .collect(),
    )
}

/// The node to move to when stepping forward from `node`.
///
/// Uses the recorded pointer if there is one, else the target of the first
/// link leaving `node`.
pub fn nav_forward<'g>(
    history: &NavigationHistory,
    graph: &'g Graph,
    node: &str,
) -> Option<&'g Node> {
    step(graph, node, |handle| history.forward(handle), |link_source, _| {
        link_source == node
    })
}

/// The node to move to when stepping backward from `node`.
///
/// Uses the recorded pointer if there is one, else the source of the first
/// link pointing at `node`.
pub fn nav_backward<'g>(
    history: &NavigationHistory,
    graph: &'g Graph,
    node: &str,
) -> Option<&'g Node> {
    step(graph, node, |handle| history.backward(handle), |_, link_target| {
        link_target == node
    })
}

fn step<'g, R, F>(graph: &'g Graph, node: &str, recorded: R, fallback: F) -> Option<&'g Node>
where
    R: Fn(Handle) -> Option<Handle>,
    F: Fn(&str, &str) -> bool,
{
    let current = graph.node_by_path(node)?;

    if let Some(next) = current
        .handle()
        .and_then(recorded)
        .and_then(|handle| graph.node_by_handle(handle))
    {
        return Some(next);
    }

    current
        .link_positions()
        .iter()
        .filter_map(|pos| graph.links().get(*pos))
        .find(|link| fallback(link.source(), link.target()))
        .and_then(|link| graph.node_by_path(link.other_end(node)))
}
