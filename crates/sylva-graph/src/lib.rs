//! Sylva Graph - Link graph exploration
//!
//! This crate holds the in-memory graph of documents and the links between
//! them, and everything needed to explore it interactively: bounded
//! neighborhood traversal, incremental expansion that keeps node identity,
//! directional navigation history and a bidirectional tag index.
//!
//! # Architecture
//!
//! A [`Graph`] is two dense arrays plus indexes for:
//! - Path-based node lookups
//! - (source, target) link lookups
//! - Handle-based lookups for displayed nodes
//!
//! The global graph is built once from host data by [`GraphBuilder`]. An
//! [`Explorer`] session derives displayed graphs from it and grows them as
//! the user expands nodes.
//!
//! # Example
//!
//! ```
//! use sylva_core::Document;
//! use sylva_graph::{Explorer, ExplorerConfig, GraphBuilder};
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_documents(vec![Document::new("a.md"), Document::new("b.md")]);
//! builder.add_link("a.md", "b.md");
//! let vault = builder.build().unwrap();
//!
//! let mut explorer = Explorer::new(ExplorerConfig::default());
//! explorer.show_local(&vault.graph, "a.md", &vault.tags).unwrap();
//! assert_eq!(explorer.displayed().node_count(), 2);
//! ```

mod builder;
mod error;
mod explorer;
mod graph;
mod link;
mod local;
mod merge;
mod navigation;
mod node;
mod tags;
mod traversal;

pub use builder::{GraphBuilder, Vault};
pub use error::{GraphError, Result};
pub use explorer::{ExpandOutcome, Explorer, ExplorerConfig, PendingExpansion};
pub use graph::{Graph, GraphScope};
pub use link::{GraphExport, GraphStats, Link};
pub use local::{apply_options, local_graph, LocalGraphOptions, SearchQuery};
pub use merge::{merge_subgraph, MergeStats};
pub use navigation::{nav_backward, nav_forward, shortest_path, NavigationHistory};
pub use node::{Handle, HandleAllocator, Node};
pub use tags::{normalize_tag, TagIndex};
pub use traversal::{traverse, Neighborhood};
