//! Builds the global graph and tag index from host data.
//!
//! The builder collects documents, links and tags in any order, then
//! resolves everything in one pass when `build` is called. Links whose
//! endpoints never showed up as documents are dropped there, because the
//! host's link cache may reference files that were deleted.

use crate::error::Result;
use crate::graph::Graph;
use crate::tags::TagIndex;
use std::collections::{BTreeMap, HashSet};
use sylva_core::{Document, LinkMap, VaultSnapshot};
use tracing::{debug, warn};

/// Everything the engine knows about a vault.
#[derive(Debug, Clone, Default)]
pub struct Vault {
    /// The graph over every document.
    pub graph: Graph,
    /// Tags per document.
    pub tags: TagIndex,
    /// Heading titles per note, for imploding.
    pub sections: BTreeMap<String, Vec<String>>,
}

impl Vault {
    /// Builds a vault from a validated snapshot.
    pub fn from_snapshot(snapshot: &VaultSnapshot) -> Result<Self> {
        let mut builder = GraphBuilder::new();
        builder.add_documents(snapshot.documents.iter().cloned());
        for (source, targets) in &snapshot.links {
            for target in targets {
                builder.add_link(source, target);
            }
        }
        for (path, tags) in &snapshot.tags {
            builder.add_tags(path, tags.iter().cloned());
        }
        for (path, headings) in &snapshot.sections {
            builder.add_sections(path, headings.iter().cloned());
        }
        builder.build()
    }

    /// Headings of a note, empty if it has none.
    pub fn sections_for(&self, path: &str) -> &[String] {
        self.sections.get(path).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Accumulates host data for a [`Vault`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    documents: Vec<Document>,
    links: LinkMap,
    tags: BTreeMap<String, Vec<String>>,
    sections: BTreeMap<String, Vec<String>>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds documents. A path seen before is ignored.
    pub fn add_documents<I>(&mut self, documents: I)
    where
        I: IntoIterator<Item = Document>,
    {
        self.documents.extend(documents);
    }

    /// Records a link; it is resolved in [`GraphBuilder::build`].
    pub fn add_link(&mut self, source: &str, target: &str) {
        self.links
            .entry(source.to_string())
            .or_default()
            .push(target.to_string());
    }

    /// Records the tags of a document.
    pub fn add_tags<I>(&mut self, path: &str, tags: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.tags.entry(path.to_string()).or_default().extend(tags);
    }

    /// Records the headings of a note.
    pub fn add_sections<I>(&mut self, path: &str, headings: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.sections
            .entry(path.to_string())
            .or_default()
            .extend(headings);
    }

    /// Resolves links and tags against the known documents.
    pub fn build(self) -> Result<Vault> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.documents.len());
        let documents: Vec<Document> = self
            .documents
            .iter()
            .filter(|doc| seen.insert(doc.path.as_str()))
            .cloned()
            .collect();

        let mut links = LinkMap::new();
        let mut dropped = 0;
        for (source, targets) in self.links {
            if !seen.contains(source.as_str()) {
                dropped += targets.len();
                continue;
            }
            let resolved: Vec<String> = targets
                .into_iter()
                .filter(|target| {
                    let known = seen.contains(target.as_str());
                    if !known {
                        dropped += 1;
                    }
                    known
                })
                .collect();
            if !resolved.is_empty() {
                links.insert(source, resolved);
            }
        }
        if dropped > 0 {
            warn!("Dropped {} links to unknown documents", dropped);
        }

        let graph = Graph::from_link_map(&links, &documents)?;

        let mut tags = TagIndex::new();
        for (path, node_tags) in &self.tags {
            if graph.contains(path) {
                tags.add_tags(path, node_tags);
            }
        }

        let sections: BTreeMap<String, Vec<String>> = self
            .sections
            .into_iter()
            .filter(|(path, _)| graph.contains(path))
            .collect();

        debug!(
            "Built vault: {} nodes, {} links, {} tagged documents",
            graph.node_count(),
            graph.link_count(),
            tags.len()
        );

        Ok(Vault {
            graph,
            tags,
            sections,
        })
    }
}
