//! Incremental merge of a freshly traversed subgraph into the display.
//!
//! Nodes already on screen are never replaced: the incoming copy is
//! dropped and links resolve to the existing node by path, so whatever
//! state a consumer attached to it survives. Links already on screen are
//! dropped too. Everything new is appended, and new nodes get a handle
//! from the session allocator.

use crate::error::Result;
use crate::graph::Graph;
use crate::node::HandleAllocator;
use tracing::debug;

/// What a merge added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub nodes_added: usize,
    pub links_added: usize,
}

impl MergeStats {
    /// True if the merge added nothing.
    pub fn is_empty(&self) -> bool {
        self.nodes_added == 0 && self.links_added == 0
    }
}

/// Folds `incoming` into `displayed`.
///
/// Merging the same subgraph twice adds nothing the second time and
/// allocates no handles. Expansion flags are left to the caller.
pub fn merge_subgraph(
    displayed: &mut Graph,
    incoming: &Graph,
    handles: &mut HandleAllocator,
) -> Result<MergeStats> {
    let mut stats = MergeStats::default();

    for node in incoming.nodes() {
        if displayed.contains(node.id()) {
            continue;
        }
        let mut node = node.clone();
        node.handle = Some(handles.allocate());
        node.expanded = false;
        node.imploded = false;
        displayed.push_node(node)?;
        stats.nodes_added += 1;
    }

    for link in incoming.links() {
        if displayed.link(link.source(), link.target()).is_some() {
            continue;
        }
        displayed.push_link(link.clone())?;
        stats.links_added += 1;
    }

    debug!(
        "Merged subgraph: +{} nodes, +{} links (now {} nodes, {} links)",
        stats.nodes_added,
        stats.links_added,
        displayed.node_count(),
        displayed.link_count()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphScope;
    use crate::traversal::traverse;
    use sylva_core::{Document, LinkDirection, LinkMap};

    fn global() -> Graph {
        // A → B → C, B → D, D → A
        let docs: Vec<Document> = ["A", "B", "C", "D"].iter().map(|p| Document::new(*p)).collect();
        let mut map = LinkMap::new();
        map.insert("A".into(), vec!["B".into()]);
        map.insert("B".into(), vec!["C".into(), "D".into()]);
        map.insert("D".into(), vec!["A".into()]);
        Graph::from_link_map(&map, &docs).unwrap()
    }

    fn around(graph: &Graph, center: &str) -> Graph {
        traverse(graph, center, 1, LinkDirection::Both)
            .into_graph()
            .unwrap()
    }

    #[test]
    fn test_merge_appends_new_nodes_and_links() {
        let global = global();
        let mut handles = HandleAllocator::new();
        let mut shown = traverse(&global, "A", 0, LinkDirection::Both)
            .into_graph()
            .unwrap();
        shown.assign_handles(GraphScope::Displayed, &mut handles);

        let stats = merge_subgraph(&mut shown, &around(&global, "A"), &mut handles).unwrap();
        assert_eq!(stats.nodes_added, 2); // B, D
        assert_eq!(stats.links_added, 2); // A → B, D → A
        assert_eq!(shown.node_count(), 3);
        assert!(shown.nodes().iter().all(|n| n.handle().is_some()));
        shown.assert_consistent();
    }

    #[test]
    fn test_merge_keeps_existing_node_state() {
        let global = global();
        let mut handles = HandleAllocator::new();
        let mut shown = around(&global, "A");
        shown.assign_handles(GraphScope::Displayed, &mut handles);
        shown
            .node_mut("B")
            .unwrap()
            .state
            .insert("label".into(), "pinned".into());
        let b_handle = shown.node_by_path("B").unwrap().handle();

        merge_subgraph(&mut shown, &around(&global, "B"), &mut handles).unwrap();

        let b = shown.node_by_path("B").unwrap();
        assert_eq!(b.handle(), b_handle);
        assert_eq!(b.state["label"], "pinned");
        assert!(shown.link("B", "C").is_some());
        shown.assert_consistent();
    }

    #[test]
    fn test_merge_twice_is_idempotent() {
        let global = global();
        let mut handles = HandleAllocator::new();
        let mut shown = around(&global, "A");
        shown.assign_handles(GraphScope::Displayed, &mut handles);

        let incoming = around(&global, "B");
        merge_subgraph(&mut shown, &incoming, &mut handles).unwrap();
        let (nodes, links, allocated) = (shown.node_count(), shown.link_count(), handles.allocated());

        let stats = merge_subgraph(&mut shown, &incoming, &mut handles).unwrap();
        assert!(stats.is_empty());
        assert_eq!(shown.node_count(), nodes);
        assert_eq!(shown.link_count(), links);
        assert_eq!(handles.allocated(), allocated);
    }

    #[test]
    fn test_handles_never_collide_across_merges() {
        let global = global();
        let mut handles = HandleAllocator::new();
        let mut shown = traverse(&global, "C", 0, LinkDirection::Both)
            .into_graph()
            .unwrap();
        shown.assign_handles(GraphScope::Displayed, &mut handles);

        for center in ["C", "B", "D", "A"] {
            merge_subgraph(&mut shown, &around(&global, center), &mut handles).unwrap();
        }

        let mut seen: Vec<_> = shown.nodes().iter().filter_map(|n| n.handle()).collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
        assert_eq!(total, 4);
    }
}
