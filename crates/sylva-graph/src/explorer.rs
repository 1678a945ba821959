//! The exploration session.
//!
//! `Explorer` owns what the user is looking at: the displayed graph, the
//! handle allocator, the navigation history and the current selection.
//! Hosts drive it with explicit commands (show a local graph, expand,
//! implode, select, filter, replace) and use the returned outcomes to
//! decide whether anything downstream needs to redraw.
//!
//! Expansion is split in two so a host can do asynchronous work between
//! fetching a neighborhood and merging it: [`Explorer::prepare_expand`]
//! only reads, and [`Explorer::apply_expansion`] re-checks the displayed
//! graph before touching it, because another expansion may have landed in
//! between.

use crate::error::Result;
use crate::graph::Graph;
use crate::link::Link;
use crate::local::{local_graph, LocalGraphOptions};
use crate::merge::{merge_subgraph, MergeStats};
use crate::navigation::{nav_backward, nav_forward, NavigationHistory};
use crate::node::{HandleAllocator, Node};
use crate::tags::TagIndex;
use serde::{Deserialize, Serialize};
use sylva_core::NodeKind;
use tracing::{debug, warn};

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExplorerConfig {
    /// Options for local graphs and the neighborhoods fetched on expand.
    pub local: LocalGraphOptions,
    /// How many hops an expansion reveals.
    pub expand_depth: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            local: LocalGraphOptions::default(),
            expand_depth: 1,
        }
    }
}

/// A neighborhood fetched for expansion but not yet merged.
#[derive(Debug, Clone)]
pub struct PendingExpansion {
    focus: String,
    subgraph: Graph,
    resolved: bool,
    was_displayed: bool,
}

impl PendingExpansion {
    /// The node being expanded.
    pub fn focus(&self) -> &str {
        &self.focus
    }

    /// The fetched neighborhood; empty if the node was unknown.
    pub fn subgraph(&self) -> &Graph {
        &self.subgraph
    }

    /// Whether the node exists in the global graph.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Whether the node was on screen when the neighborhood was fetched.
    pub fn was_displayed(&self) -> bool {
        self.was_displayed
    }
}

/// What an expansion did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// The node was not on screen; the display was replaced by its
    /// neighborhood.
    Fresh { focus: String, stats: MergeStats },
    /// The neighborhood was merged into the display.
    Merged { focus: String, stats: MergeStats },
    /// The node was already expanded; it was only reselected.
    Reselected { focus: String },
    /// The node does not exist anywhere; nothing changed.
    Unresolved { focus: String },
    /// The node left the display after its neighborhood was fetched;
    /// nothing changed.
    Stale { focus: String },
}

impl ExpandOutcome {
    /// The node that triggered the expansion.
    pub fn focus(&self) -> &str {
        match self {
            Self::Fresh { focus, .. }
            | Self::Merged { focus, .. }
            | Self::Reselected { focus }
            | Self::Unresolved { focus }
            | Self::Stale { focus } => focus,
        }
    }

    /// Whether the displayed graph changed.
    pub fn changed_graph(&self) -> bool {
        match self {
            Self::Fresh { .. } => true,
            Self::Merged { stats, .. } => !stats.is_empty(),
            Self::Reselected { .. } | Self::Unresolved { .. } | Self::Stale { .. } => false,
        }
    }
}

/// An exploration session over one global graph.
#[derive(Debug, Default)]
pub struct Explorer {
    config: ExplorerConfig,
    displayed: Graph,
    handles: HandleAllocator,
    history: NavigationHistory,
    selected: Option<String>,
}

impl Explorer {
    /// Creates a session with nothing displayed.
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Mutable access to the configuration; takes effect on the next
    /// command.
    pub fn config_mut(&mut self) -> &mut ExplorerConfig {
        &mut self.config
    }

    /// The graph currently on screen.
    pub fn displayed(&self) -> &Graph {
        &self.displayed
    }

    /// Mutable access to consumer state on a displayed node.
    pub fn displayed_node_mut(&mut self, path: &str) -> Option<&mut Node> {
        self.displayed.node_mut(path)
    }

    /// The navigation history.
    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    /// The selected node's path.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Whole-graph commands
    // ─────────────────────────────────────────────────────────────────────

    /// Displays the local graph around `center` and selects it.
    ///
    /// Returns whether the displayed graph changed.
    pub fn show_local(&mut self, global: &Graph, center: &str, tags: &TagIndex) -> Result<bool> {
        let graph = local_graph(global, center, &self.config.local, tags)?;
        let changed = self.replace(graph);
        self.select(center);
        Ok(changed)
    }

    /// Replaces the displayed graph.
    ///
    /// A structurally identical graph is ignored so that handles and node
    /// state on screen stay as they are. Otherwise nodes that were already
    /// displayed keep their handle and state, and new nodes get fresh
    /// handles. Returns whether anything changed.
    pub fn replace(&mut self, mut graph: Graph) -> bool {
        if Graph::compare(&self.displayed, &graph) {
            debug!("Replacement graph is unchanged, keeping the current one");
            return false;
        }

        graph.carry_over_display(&self.displayed, &mut self.handles);
        self.displayed = graph;
        self.history.clear();
        self.drop_stale_selection();
        true
    }

    /// Filters the displayed graph in place. Returns whether it changed.
    pub fn apply_filter<N>(&mut self, keep_node: N) -> bool
    where
        N: Fn(&Node) -> bool,
    {
        self.apply_filter_with_links(keep_node, |_| true)
    }

    /// Filters the displayed graph's nodes and links in place.
    pub fn apply_filter_with_links<N, L>(&mut self, keep_node: N, keep_link: L) -> bool
    where
        N: Fn(&Node) -> bool,
        L: Fn(&Link) -> bool,
    {
        let filtered = self.displayed.filter_with_links(keep_node, keep_link);
        if Graph::compare(&self.displayed, &filtered) {
            return false;
        }
        self.displayed = filtered;
        self.drop_stale_selection();
        true
    }

    fn drop_stale_selection(&mut self) {
        let stale = matches!(&self.selected, Some(path) if !self.displayed.contains(path));
        if stale {
            self.selected = None;
        }
    }

    /// Clears the display, history and selection. Handles keep counting.
    pub fn reset(&mut self) {
        self.displayed = Graph::new();
        self.history.clear();
        self.selected = None;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expand / implode
    // ─────────────────────────────────────────────────────────────────────

    /// Expands `path`: fetches its neighborhood and merges it.
    pub fn expand(&mut self, global: &Graph, path: &str, tags: &TagIndex) -> Result<ExpandOutcome> {
        let pending = self.prepare_expand(global, path, tags)?;
        self.apply_expansion(pending)
    }

    /// Fetches the neighborhood of `path` without touching the display.
    pub fn prepare_expand(
        &self,
        global: &Graph,
        path: &str,
        tags: &TagIndex,
    ) -> Result<PendingExpansion> {
        if !global.contains(path) {
            warn!("Cannot expand {}: not in the global graph", path);
            return Ok(PendingExpansion {
                focus: path.to_string(),
                subgraph: Graph::new(),
                resolved: false,
                was_displayed: false,
            });
        }

        let options = LocalGraphOptions {
            depth: self.config.expand_depth,
            ..self.config.local.clone()
        };
        let subgraph = local_graph(global, path, &options, tags)?;

        Ok(PendingExpansion {
            focus: path.to_string(),
            subgraph,
            resolved: true,
            was_displayed: self.displayed.contains(path),
        })
    }

    /// Applies a fetched neighborhood to the current display.
    ///
    /// The display is checked again first: if the node was expanded in the
    /// meantime this only reselects it, and if it was on screen when the
    /// neighborhood was fetched but has since been replaced away, nothing
    /// happens. A node that was never displayed replaces the display with
    /// its neighborhood.
    pub fn apply_expansion(&mut self, pending: PendingExpansion) -> Result<ExpandOutcome> {
        let PendingExpansion {
            focus,
            subgraph,
            resolved,
            was_displayed,
        } = pending;

        if !resolved {
            return Ok(ExpandOutcome::Unresolved { focus });
        }

        let expanded = self.displayed.node_by_path(&focus).map(Node::is_expanded);
        let outcome = match expanded {
            Some(true) => {
                debug!("{} is already expanded, reselecting", focus);
                self.select(&focus);
                return Ok(ExpandOutcome::Reselected { focus });
            }
            Some(false) => {
                let stats = merge_subgraph(&mut self.displayed, &subgraph, &mut self.handles)?;
                self.displayed.set_expanded(&focus, true);
                ExpandOutcome::Merged {
                    focus: focus.clone(),
                    stats,
                }
            }
            None if was_displayed => {
                debug!("{} left the display before its expansion landed", focus);
                return Ok(ExpandOutcome::Stale { focus });
            }
            None => {
                let stats = MergeStats {
                    nodes_added: subgraph.node_count(),
                    links_added: subgraph.link_count(),
                };
                let mut fresh = subgraph;
                fresh.carry_over_display(&self.displayed, &mut self.handles);
                fresh.set_expanded(&focus, true);
                self.displayed = fresh;
                self.history.clear();
                self.selected = None;
                ExpandOutcome::Fresh {
                    focus: focus.clone(),
                    stats,
                }
            }
        };

        self.select(&focus);
        Ok(outcome)
    }

    /// Adds a note's sections as sub-nodes linked from it.
    ///
    /// Section paths are `<note>#<heading>`. Returns the number of sections
    /// added; zero if the node is not displayed or already imploded.
    pub fn implode<S: AsRef<str>>(&mut self, path: &str, sections: &[S]) -> Result<usize> {
        match self.displayed.node_by_path(path).map(Node::is_imploded) {
            Some(false) => {}
            Some(true) => {
                debug!("{} is already imploded", path);
                return Ok(0);
            }
            None => return Ok(0),
        }

        let mut added = 0;
        for heading in sections {
            let heading = heading.as_ref();
            let id = format!("{}#{}", path, heading);
            if self.displayed.contains(&id) {
                continue;
            }
            let mut section = Node::new(id.clone(), heading, NodeKind::Section);
            section.handle = Some(self.handles.allocate());
            self.displayed.push_node(section)?;
            self.displayed.push_link(Link::new(path, id))?;
            added += 1;
        }

        self.displayed.set_imploded(path, true);
        debug!("Imploded {} into {} sections", path, added);
        Ok(added)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selection and navigation
    // ─────────────────────────────────────────────────────────────────────

    /// Selects a displayed node and records the move in the navigation
    /// history. Returns false if the node is not displayed.
    pub fn select(&mut self, path: &str) -> bool {
        if !self.displayed.contains(path) {
            return false;
        }

        // Capture the previous selection before changing it; the history
        // needs the path from where the user was.
        let previous = self.selected.replace(path.to_string());
        if let Some(previous) = previous {
            if previous != path {
                self.history
                    .record_transition(&self.displayed, &previous, path);
            }
        }
        true
    }

    /// Clears the selection without touching the history.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// The node a forward step would select.
    pub fn peek_forward(&self) -> Option<&Node> {
        let current = self.selected.as_deref()?;
        nav_forward(&self.history, &self.displayed, current)
    }

    /// The node a backward step would select.
    pub fn peek_backward(&self) -> Option<&Node> {
        let current = self.selected.as_deref()?;
        nav_backward(&self.history, &self.displayed, current)
    }

    /// Moves the selection one step forward. Returns the new selection.
    pub fn step_forward(&mut self) -> Option<String> {
        let next = self.peek_forward()?.id().to_string();
        self.select(&next);
        Some(next)
    }

    /// Moves the selection one step backward. Returns the new selection.
    pub fn step_backward(&mut self) -> Option<String> {
        let next = self.peek_backward()?.id().to_string();
        self.select(&next);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Handle;
    use sylva_core::{Document, LinkMap};

    fn global() -> Graph {
        // A → B → C → D, and E on its own.
        let docs: Vec<Document> = ["A.md", "B.md", "C.md", "D.md", "E.md"]
            .iter()
            .map(|p| Document::new(*p))
            .collect();
        let mut map = LinkMap::new();
        map.insert("A.md".into(), vec!["B.md".into()]);
        map.insert("B.md".into(), vec!["C.md".into()]);
        map.insert("C.md".into(), vec!["D.md".into()]);
        Graph::from_link_map(&map, &docs).unwrap()
    }

    fn explorer() -> Explorer {
        Explorer::new(ExplorerConfig::default())
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: ExplorerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ExplorerConfig::default());
        assert_eq!(config.expand_depth, 1);
    }

    #[test]
    fn test_show_local_selects_center() {
        let global = global();
        let tags = TagIndex::new();
        let mut session = explorer();

        assert!(session.show_local(&global, "B.md", &tags).unwrap());
        assert_eq!(session.displayed().node_count(), 3);
        assert_eq!(session.selected(), Some("B.md"));
        assert!(session
            .displayed()
            .nodes()
            .iter()
            .all(|n| n.handle().is_some()));
    }

    #[test]
    fn test_show_local_twice_keeps_state() {
        let global = global();
        let tags = TagIndex::new();
        let mut session = explorer();

        session.show_local(&global, "B.md", &tags).unwrap();
        session
            .displayed_node_mut("A.md")
            .unwrap()
            .state
            .insert("selected".into(), true.into());

        assert!(!session.show_local(&global, "B.md", &tags).unwrap());
        assert_eq!(session.displayed().node_by_path("A.md").unwrap().state["selected"], true);
    }

    #[test]
    fn test_expand_merges_and_marks_expanded() {
        let global = global();
        let tags = TagIndex::new();
        let mut session = explorer();
        session.show_local(&global, "A.md", &tags).unwrap();

        let outcome = session.expand(&global, "B.md", &tags).unwrap();
        assert_eq!(
            outcome,
            ExpandOutcome::Merged {
                focus: "B.md".into(),
                stats: MergeStats {
                    nodes_added: 1,
                    links_added: 1
                }
            }
        );
        assert!(outcome.changed_graph());
        assert!(session.displayed().node_by_path("B.md").unwrap().is_expanded());
        assert!(session.displayed().link("B.md", "C.md").is_some());
        assert_eq!(session.selected(), Some("B.md"));
        session.displayed().assert_consistent();
    }

    #[test]
    fn test_expand_twice_is_a_reselect() {
        let global = global();
        let tags = TagIndex::new();
        let mut session = explorer();
        session.show_local(&global, "A.md", &tags).unwrap();

        session.expand(&global, "B.md", &tags).unwrap();
        let nodes = session.displayed().node_count();
        let links = session.displayed().link_count();
        let handles = session.handles.allocated();

        session.select("A.md");
        let outcome = session.expand(&global, "B.md", &tags).unwrap();
        assert_eq!(
            outcome,
            ExpandOutcome::Reselected {
                focus: "B.md".into()
            }
        );
        assert!(!outcome.changed_graph());
        assert_eq!(session.displayed().node_count(), nodes);
        assert_eq!(session.displayed().link_count(), links);
        assert_eq!(session.handles.allocated(), handles);
        assert_eq!(session.selected(), Some("B.md"));
    }

    #[test]
    fn test_expand_outside_view_replaces_display() {
        let global = global();
        let tags = TagIndex::new();
        let mut session = explorer();
        session.show_local(&global, "A.md", &tags).unwrap();

        let outcome = session.expand(&global, "D.md", &tags).unwrap();
        assert!(matches!(outcome, ExpandOutcome::Fresh { .. }));
        assert!(!session.displayed().contains("A.md"));
        assert!(session.displayed().contains("C.md"));
        assert!(session.displayed().node_by_path("D.md").unwrap().is_expanded());
        // Handles from the earlier view are never reused.
        assert!(session
            .displayed()
            .nodes()
            .iter()
            .all(|n| n.handle().unwrap() >= Handle(2)));
    }

    #[test]
    fn test_expand_unknown_node() {
        let global = global();
        let tags = TagIndex::new();
        let mut session = explorer();
        session.show_local(&global, "A.md", &tags).unwrap();
        let before = session.displayed().clone();

        let pending = session.prepare_expand(&global, "ghost.md", &tags).unwrap();
        assert!(!pending.is_resolved());
        assert!(pending.subgraph().is_empty());

        let outcome = session.apply_expansion(pending).unwrap();
        assert_eq!(
            outcome,
            ExpandOutcome::Unresolved {
                focus: "ghost.md".into()
            }
        );
        assert!(Graph::compare(&before, session.displayed()));
    }

    #[test]
    fn test_interleaved_expansions_do_not_double_apply() {
        let global = global();
        let tags = TagIndex::new();
        let mut session = explorer();
        session.show_local(&global, "B.md", &tags).unwrap();

        // Two expansions of C are fetched before either is applied.
        let first = session.prepare_expand(&global, "C.md", &tags).unwrap();
        let second = session.prepare_expand(&global, "C.md", &tags).unwrap();

        let outcome = session.apply_expansion(first).unwrap();
        assert!(matches!(outcome, ExpandOutcome::Merged { .. }));
        let nodes = session.displayed().node_count();

        let outcome = session.apply_expansion(second).unwrap();
        assert!(matches!(outcome, ExpandOutcome::Reselected { .. }));
        assert_eq!(session.displayed().node_count(), nodes);
    }

    #[test]
    fn test_stale_expansion_leaves_newer_view_alone() {
        let global = global();
        let tags = TagIndex::new();
        let mut session = explorer();
        session.show_local(&global, "A.md", &tags).unwrap();

        let pending = session.prepare_expand(&global, "B.md", &tags).unwrap();
        assert!(pending.was_displayed());

        // D is not on screen, so this replaces the display before B lands.
        let outcome = session.expand(&global, "D.md", &tags).unwrap();
        assert!(matches!(outcome, ExpandOutcome::Fresh { .. }));
        let before = session.displayed().clone();
        let handles = session.handles.allocated();

        let outcome = session.apply_expansion(pending).unwrap();
        assert_eq!(
            outcome,
            ExpandOutcome::Stale {
                focus: "B.md".into()
            }
        );
        assert!(!outcome.changed_graph());
        assert!(Graph::compare(&before, session.displayed()));
        assert!(session.displayed().contains("C.md"));
        assert!(session.displayed().contains("D.md"));
        assert!(!session.displayed().contains("A.md"));
        assert_eq!(session.handles.allocated(), handles);
        assert_eq!(session.selected(), Some("D.md"));
    }

    #[test]
    fn test_replace_keeps_handles_and_state_of_shown_nodes() {
        let global = global();
        let tags = TagIndex::new();
        let mut session = explorer();
        session.show_local(&global, "B.md", &tags).unwrap();

        let a = session.displayed().node_by_path("A.md").unwrap().handle();
        session
            .displayed_node_mut("A.md")
            .unwrap()
            .state
            .insert("color".into(), "red".into());
        let handles = session.handles.allocated();

        session.config_mut().local.depth = 2;
        assert!(session.show_local(&global, "B.md", &tags).unwrap());

        let kept = session.displayed().node_by_path("A.md").unwrap();
        assert_eq!(kept.handle(), a);
        assert_eq!(kept.state["color"], "red");
        // Only D is new.
        assert_eq!(session.displayed().node_count(), 4);
        assert_eq!(session.handles.allocated(), handles + 1);
        session.displayed().assert_consistent();
    }

    #[test]
    fn test_implode_adds_sections_once() {
        let global = global();
        let tags = TagIndex::new();
        let mut session = explorer();
        session.show_local(&global, "A.md", &tags).unwrap();

        let added = session.implode("A.md", &["Intro", "Usage"]).unwrap();
        assert_eq!(added, 2);
        let section = session.displayed().node_by_path("A.md#Intro").unwrap();
        assert_eq!(section.kind, NodeKind::Section);
        assert!(section.handle().is_some());
        assert!(session.displayed().link("A.md", "A.md#Usage").is_some());
        assert!(session.displayed().node_by_path("A.md").unwrap().is_imploded());

        assert_eq!(session.implode("A.md", &["Intro", "More"]).unwrap(), 0);
        assert_eq!(session.implode("E.md", &["Nope"]).unwrap(), 0);
        session.displayed().assert_consistent();
    }

    #[test]
    fn test_selection_records_history_and_steps() {
        let global = global();
        let tags = TagIndex::new();
        let mut session = Explorer::new(ExplorerConfig {
            local: LocalGraphOptions {
                depth: 3,
                ..LocalGraphOptions::default()
            },
            ..ExplorerConfig::default()
        });
        session.show_local(&global, "A.md", &tags).unwrap();

        assert!(session.select("C.md"));
        assert_eq!(session.history().len(), 2);
        assert!(!session.select("ghost.md"));
        assert_eq!(session.selected(), Some("C.md"));

        assert_eq!(session.step_backward().as_deref(), Some("B.md"));
        assert_eq!(session.step_backward().as_deref(), Some("A.md"));
        assert_eq!(session.step_backward(), None);
        assert_eq!(session.step_forward().as_deref(), Some("B.md"));
        assert_eq!(session.peek_forward().map(|n| n.id()), Some("C.md"));
    }

    #[test]
    fn test_apply_filter_and_reset() {
        let global = global();
        let tags = TagIndex::new();
        let mut session = explorer();
        session.show_local(&global, "B.md", &tags).unwrap();

        assert!(!session.apply_filter(|_| true));
        assert!(session.apply_filter(|n| n.id() != "B.md"));
        assert_eq!(session.selected(), None);
        assert_eq!(session.displayed().link_count(), 0);

        session.reset();
        assert!(session.displayed().is_empty());
        assert!(session.history().is_empty());
    }
}
