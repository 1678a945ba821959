//! Host-supplied vault snapshot.
//!
//! The host application owns the file system and the metadata cache. It
//! hands Sylva one flat snapshot: the documents, who links to whom, the
//! tags of each document and the headings of each note. The engine builds
//! the global graph from it once and treats it as read-mostly afterwards.

use crate::error::{CoreError, Result};
use crate::node::NodeKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Document path -> paths it links to.
///
/// Ordered so that graphs built from the same snapshot always list their
/// links in the same order.
pub type LinkMap = BTreeMap<String, Vec<String>>;

/// A single document known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct Document {
    /// Vault-relative path, the document's identity.
    pub path: String,
    /// Display name.
    pub name: String,
    /// Note or attachment.
    pub kind: NodeKind,
}

#[derive(Deserialize)]
struct RawDocument {
    path: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    kind: Option<NodeKind>,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        let mut doc = Document::new(raw.path);
        if let Some(name) = raw.name {
            doc.name = name;
        }
        if let Some(kind) = raw.kind {
            doc.kind = kind;
        }
        doc
    }
}

impl Document {
    /// Creates a document, deriving its name from the file stem and its kind
    /// from the extension.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = display_name(&path);
        let kind = NodeKind::from_path(&path);
        Self { path, name, kind }
    }

    /// Overrides the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// `notes/Daily Log.md` -> `Daily Log`; attachments keep their extension.
fn display_name(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("md") && !stem.is_empty() => {
            stem.to_string()
        }
        _ => file.to_string(),
    }
}

/// Everything the host knows about the vault at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSnapshot {
    /// All documents, in the order they should appear in the global graph.
    pub documents: Vec<Document>,

    /// Resolved links between documents.
    #[serde(default)]
    pub links: LinkMap,

    /// Tags per document, `#`-prefixed.
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,

    /// Heading titles per note, used when a note is imploded.
    #[serde(default)]
    pub sections: BTreeMap<String, Vec<String>>,
}

impl VaultSnapshot {
    /// Reads and validates a snapshot from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot = Self::from_json(&text)?;
        debug!(
            "Loaded snapshot from {}: {} documents, {} linking documents",
            path.display(),
            snapshot.documents.len(),
            snapshot.links.len()
        );
        Ok(snapshot)
    }

    /// Parses and validates a snapshot from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(text)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Records a link from `source` to `target`.
    pub fn link(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.links
            .entry(source.into())
            .or_default()
            .push(target.into());
    }

    /// Checks that document paths are unique and that every link endpoint
    /// names a known document.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.documents.len());
        for doc in &self.documents {
            if !seen.insert(doc.path.as_str()) {
                return Err(CoreError::InvalidSnapshot(format!(
                    "document '{}' is listed twice",
                    doc.path
                )));
            }
        }

        for (source, targets) in &self.links {
            if !seen.contains(source.as_str()) {
                return Err(CoreError::InvalidSnapshot(format!(
                    "link source '{}' is not a known document",
                    source
                )));
            }
            if let Some(target) = targets.iter().find(|t| !seen.contains(t.as_str())) {
                return Err(CoreError::InvalidSnapshot(format!(
                    "link target '{}' (from '{}') is not a known document",
                    target, source
                )));
            }
        }

        Ok(())
    }

    /// Tags for one document, empty if none were recorded.
    pub fn tags_for(&self, path: &str) -> &[String] {
        self.tags.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Headings for one note, empty if none were recorded.
    pub fn sections_for(&self, path: &str) -> &[String] {
        self.sections.get(path).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_document_defaults() {
        let doc = Document::new("notes/Daily Log.md");
        assert_eq!(doc.name, "Daily Log");
        assert_eq!(doc.kind, NodeKind::Note);

        let img = Document::new("assets/cat.png");
        assert_eq!(img.name, "cat.png");
        assert_eq!(img.kind, NodeKind::Attachment);
    }

    #[test]
    fn test_parse_minimal_json() {
        let json = r##"{
            "documents": [
                {"path": "a.md"},
                {"path": "b.md", "name": "Bee"},
                {"path": "c.pdf", "kind": "note"}
            ],
            "links": {"a.md": ["b.md", "c.pdf"]},
            "tags": {"a.md": ["#x"]}
        }"##;

        let snapshot = VaultSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.documents.len(), 3);
        assert_eq!(snapshot.documents[1].name, "Bee");
        assert_eq!(snapshot.documents[2].kind, NodeKind::Note);
        assert_eq!(snapshot.tags_for("a.md"), ["#x".to_string()]);
        assert!(snapshot.tags_for("b.md").is_empty());
        assert!(snapshot.sections_for("a.md").is_empty());
    }

    #[test]
    fn test_duplicate_document_rejected() {
        let json = r#"{"documents": [{"path": "a.md"}, {"path": "a.md"}]}"#;
        let err = VaultSnapshot::from_json(json).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_unknown_link_target_rejected() {
        let mut snapshot = VaultSnapshot::default();
        snapshot.documents.push(Document::new("a.md"));
        snapshot.link("a.md", "ghost.md");

        let err = snapshot.validate().unwrap_err();
        assert!(err.to_string().contains("ghost.md"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"documents": [{{"path": "a.md"}}, {{"path": "b.md"}}], "links": {{"a.md": ["b.md"]}}}}"#
        )
        .unwrap();

        let snapshot = VaultSnapshot::load(file.path()).unwrap();
        assert_eq!(snapshot.links["a.md"], vec!["b.md".to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = VaultSnapshot::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
