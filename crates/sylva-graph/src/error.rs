//! Structural errors.
//!
//! Lookups never fail: absence is `None` or an empty collection. The only
//! errors in this crate are structural inconsistencies, which mean the code
//! that assembled a graph is broken. They are propagated, never swallowed.

use thiserror::Error;

/// Result type for graph construction.
pub type Result<T> = std::result::Result<T, GraphError>;

/// A graph that would violate its own invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A link names a node that is not in the graph.
    #[error("link {from} -> {to} references missing node '{missing}'")]
    DanglingLink {
        from: String,
        to: String,
        missing: String,
    },

    /// Two links share the same ordered (source, target) pair.
    #[error("duplicate link {from} -> {to}")]
    DuplicateLink { from: String, to: String },

    /// Two nodes share the same path.
    #[error("duplicate node '{0}'")]
    DuplicateNode(String),
}
