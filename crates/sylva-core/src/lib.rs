//! Sylva Core - Document model for the link graph
//!
//! This crate holds the types every other Sylva crate agrees on: what kind
//! of document a node is, which way a traversal follows links, and the
//! snapshot the host hands over to seed the global graph.
//!
//! # Example
//!
//! ```
//! use sylva_core::{Document, VaultSnapshot};
//!
//! let mut snapshot = VaultSnapshot::default();
//! snapshot.documents.push(Document::new("notes/a.md"));
//! snapshot.documents.push(Document::new("notes/b.md"));
//! snapshot.link("notes/a.md", "notes/b.md");
//!
//! assert_eq!(snapshot.documents[0].name, "a");
//! assert!(snapshot.validate().is_ok());
//! ```

mod error;
mod node;
mod snapshot;

pub use error::{CoreError, Result};
pub use node::{LinkDirection, NodeKind};
pub use snapshot::{Document, LinkMap, VaultSnapshot};
