//! Bounded neighborhood traversal.
//!
//! Breadth-first search from a center node out to a maximum depth,
//! following only the links the direction mode allows. Each node is
//! visited once, at its shortest distance from the center.

use crate::error::Result;
use crate::graph::Graph;
use crate::link::Link;
use crate::node::Node;
use std::collections::{HashMap, HashSet, VecDeque};
use sylva_core::LinkDirection;
use tracing::debug;

/// The nodes and links within reach of a center node.
#[derive(Debug, Clone, Default)]
pub struct Neighborhood {
    /// The center path, or empty if the center was not found.
    pub center: String,
    /// Reached nodes in visiting order; the center comes first.
    pub nodes: Vec<Node>,
    /// Links used to reach a node, plus cross links when both directions
    /// are followed.
    pub links: Vec<Link>,
    /// Hop distance from the center, by node path.
    pub depths: HashMap<String, usize>,
}

impl Neighborhood {
    /// A neighborhood with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if nothing was reached, not even the center.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Turns the neighborhood into an independent graph.
    ///
    /// Node state comes along; adjacency is rebuilt for the subgraph.
    pub fn into_graph(self) -> Result<Graph> {
        Graph::from_parts(self.nodes, self.links)
    }
}

/// Collects everything within `max_depth` hops of `center`.
///
/// A link is kept the first time it reaches an unvisited node. With
/// [`LinkDirection::Both`] a link between two nodes that are already
/// visited is kept too, so links between siblings survive. At depth zero
/// only the center comes back. An unknown center yields an empty
/// neighborhood.
pub fn traverse(
    graph: &Graph,
    center: &str,
    max_depth: usize,
    direction: LinkDirection,
) -> Neighborhood {
    let Some(center_pos) = graph.position(center) else {
        debug!("Traversal center {} not in graph", center);
        return Neighborhood::empty();
    };

    let nodes = graph.nodes();
    let links = graph.links();

    let mut depth_of: HashMap<usize, usize> = HashMap::new();
    let mut visit_order: Vec<usize> = Vec::new();
    let mut used_links: HashSet<usize> = HashSet::new();
    let mut link_order: Vec<usize> = Vec::new();
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();

    depth_of.insert(center_pos, 0);
    visit_order.push(center_pos);
    queue.push_back((center_pos, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if depth + 1 > max_depth {
            continue;
        }

        let current_id = nodes[current].id();
        for &link_pos in nodes[current].link_positions() {
            let link = &links[link_pos];
            let outbound = link.source() == current_id;
            let allowed = if outbound {
                direction.follows_outlinks()
            } else {
                direction.follows_inlinks()
            };
            if !allowed {
                continue;
            }

            let Some(neighbor) = graph.position(link.other_end(current_id)) else {
                continue;
            };

            if !depth_of.contains_key(&neighbor) {
                depth_of.insert(neighbor, depth + 1);
                visit_order.push(neighbor);
                queue.push_back((neighbor, depth + 1));
                if used_links.insert(link_pos) {
                    link_order.push(link_pos);
                }
            } else if direction == LinkDirection::Both && used_links.insert(link_pos) {
                link_order.push(link_pos);
            }
        }
    }

    let depths: HashMap<String, usize> = depth_of
        .iter()
        .map(|(pos, depth)| (nodes[*pos].id().to_string(), *depth))
        .collect();

    let result_links: Vec<Link> = link_order
        .into_iter()
        .map(|pos| {
            let mut link = links[pos].clone();
            let far = depths
                .get(link.source())
                .copied()
                .max(depths.get(link.target()).copied());
            link.distance = far;
            link
        })
        .collect();

    debug!(
        "Traversed {} (depth {}, {}): {} nodes, {} links",
        center,
        max_depth,
        direction,
        visit_order.len(),
        result_links.len()
    );

    Neighborhood {
        center: center.to_string(),
        nodes: visit_order.into_iter().map(|pos| nodes[pos].clone()).collect(),
        links: result_links,
        depths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylva_core::{Document, LinkMap};

    fn build(paths: &[&str], pairs: &[(&str, &str)]) -> Graph {
        let docs: Vec<Document> = paths.iter().map(|p| Document::new(*p)).collect();
        let mut map = LinkMap::new();
        for (s, t) in pairs {
            map.entry(s.to_string()).or_default().push(t.to_string());
        }
        Graph::from_link_map(&map, &docs).unwrap()
    }

    fn chain() -> Graph {
        // A → B → C → D
        build(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "D")])
    }

    fn ids(hood: &Neighborhood) -> Vec<&str> {
        let mut ids: Vec<&str> = hood.nodes.iter().map(|n| n.id()).collect();
        ids.sort_unstable();
        ids
    }

    fn pairs(hood: &Neighborhood) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = hood
            .links
            .iter()
            .map(|l| (l.source(), l.target()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    #[test]
    fn test_depth_zero_returns_center_only() {
        let graph = chain();
        let hood = traverse(&graph, "B", 0, LinkDirection::Both);
        assert_eq!(ids(&hood), vec!["B"]);
        assert!(hood.links.is_empty());
    }

    #[test]
    fn test_unknown_center_is_empty() {
        let graph = chain();
        let hood = traverse(&graph, "nonexistent", 3, LinkDirection::Both);
        assert!(hood.is_empty());
        assert!(hood.links.is_empty());
    }

    #[test]
    fn test_orphan_center_is_included() {
        let graph = build(&["A", "lonely"], &[]);
        let hood = traverse(&graph, "lonely", 2, LinkDirection::Both);
        assert_eq!(ids(&hood), vec!["lonely"]);
    }

    #[test]
    fn test_chain_depth_one() {
        let graph = chain();
        let hood = traverse(&graph, "B", 1, LinkDirection::Both);
        assert_eq!(ids(&hood), vec!["A", "B", "C"]);
        assert_eq!(pairs(&hood), vec![("A", "B"), ("B", "C")]);
        assert_eq!(hood.depths["A"], 1);
        assert_eq!(hood.depths["B"], 0);
    }

    #[test]
    fn test_chain_depth_two() {
        let graph = chain();
        let hood = traverse(&graph, "B", 2, LinkDirection::Both);
        assert_eq!(ids(&hood), vec!["A", "B", "C", "D"]);
        assert_eq!(pairs(&hood), vec![("A", "B"), ("B", "C"), ("C", "D")]);
        assert_eq!(hood.depths["D"], 2);
    }

    #[test]
    fn test_outlinks_only() {
        let graph = chain();
        let hood = traverse(&graph, "B", 5, LinkDirection::Outlinks);
        assert_eq!(ids(&hood), vec!["B", "C", "D"]);
        assert_eq!(pairs(&hood), vec![("B", "C"), ("C", "D")]);
    }

    #[test]
    fn test_inlinks_only() {
        let graph = chain();
        let hood = traverse(&graph, "C", 5, LinkDirection::Inlinks);
        assert_eq!(ids(&hood), vec!["A", "B", "C"]);
        assert_eq!(pairs(&hood), vec![("A", "B"), ("B", "C")]);
    }

    #[test]
    fn test_cross_links_kept_when_both_directions() {
        // Center links to two siblings that also link to each other.
        let graph = build(&["hub", "x", "y"], &[("hub", "x"), ("hub", "y"), ("x", "y")]);

        let both = traverse(&graph, "hub", 1, LinkDirection::Both);
        assert_eq!(pairs(&both), vec![("hub", "x"), ("hub", "y")]);

        let deeper = traverse(&graph, "hub", 2, LinkDirection::Both);
        assert_eq!(pairs(&deeper), vec![("hub", "x"), ("hub", "y"), ("x", "y")]);

        // Following only outlinks, x -> y reaches an already visited node.
        let out = traverse(&graph, "hub", 2, LinkDirection::Outlinks);
        assert_eq!(pairs(&out), vec![("hub", "x"), ("hub", "y")]);
    }

    #[test]
    fn test_directed_cycle_terminates() {
        // A → B → C → A
        let graph = build(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        let hood = traverse(&graph, "A", 10, LinkDirection::Outlinks);
        assert_eq!(ids(&hood), vec!["A", "B", "C"]);
        assert_eq!(pairs(&hood), vec![("A", "B"), ("B", "C")]);
    }

    #[test]
    fn test_shortest_depth_wins() {
        //     A
        //    / \
        //   B   C
        //    \ /
        //     D
        let graph = build(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        );
        let hood = traverse(&graph, "A", 3, LinkDirection::Both);
        assert_eq!(hood.depths["D"], 2);
        assert_eq!(hood.nodes.len(), 4);
        assert_eq!(hood.links.len(), 4);
    }

    #[test]
    fn test_into_graph_is_consistent() {
        let graph = chain();
        let sub = traverse(&graph, "B", 1, LinkDirection::Both)
            .into_graph()
            .unwrap();
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.node_by_path("C").unwrap().out_degree(), 0);
        sub.assert_consistent();
    }
}
