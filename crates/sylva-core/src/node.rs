//! Node and link classification.
//!
//! These enums are deliberately small. Everything the engine needs to
//! decide about a node or a traversal is spelled out here so callers pass
//! declared configuration instead of the engine probing their data.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a graph node stands for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A markdown document.
    #[default]
    Note,

    /// Any non-markdown file (image, pdf, canvas...).
    Attachment,

    /// A heading inside a note, revealed by imploding it.
    Section,
}

impl NodeKind {
    /// Guesses the kind from a document path: `.md` files are notes,
    /// everything else is an attachment.
    pub fn from_path(path: &str) -> Self {
        let is_markdown = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.eq_ignore_ascii_case("md"))
            .unwrap_or(false);

        if is_markdown {
            Self::Note
        } else {
            Self::Attachment
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Note => "note",
            Self::Attachment => "attachment",
            Self::Section => "section",
        };
        write!(f, "{}", s)
    }
}

/// Which links a traversal may follow, relative to the node being expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkDirection {
    /// Follow links in either direction.
    #[default]
    Both,

    /// Follow only links whose source is the expanded node.
    Outlinks,

    /// Follow only links whose target is the expanded node.
    Inlinks,
}

impl LinkDirection {
    /// Whether outbound links (node is the source) may be followed.
    pub fn follows_outlinks(self) -> bool {
        matches!(self, Self::Both | Self::Outlinks)
    }

    /// Whether inbound links (node is the target) may be followed.
    pub fn follows_inlinks(self) -> bool {
        matches!(self, Self::Both | Self::Inlinks)
    }
}

impl std::fmt::Display for LinkDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Both => "both",
            Self::Outlinks => "outlinks",
            Self::Inlinks => "inlinks",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for LinkDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "both" => Ok(Self::Both),
            "outlinks" | "out" => Ok(Self::Outlinks),
            "inlinks" | "in" => Ok(Self::Inlinks),
            other => Err(format!(
                "unknown link type '{}' (expected both, outlinks or inlinks)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(NodeKind::from_path("notes/a.md"), NodeKind::Note);
        assert_eq!(NodeKind::from_path("notes/A.MD"), NodeKind::Note);
        assert_eq!(NodeKind::from_path("img/cat.png"), NodeKind::Attachment);
        assert_eq!(NodeKind::from_path("README"), NodeKind::Attachment);
    }

    #[test]
    fn test_direction_flags() {
        assert!(LinkDirection::Both.follows_outlinks());
        assert!(LinkDirection::Both.follows_inlinks());
        assert!(LinkDirection::Outlinks.follows_outlinks());
        assert!(!LinkDirection::Outlinks.follows_inlinks());
        assert!(!LinkDirection::Inlinks.follows_outlinks());
        assert!(LinkDirection::Inlinks.follows_inlinks());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("both".parse::<LinkDirection>(), Ok(LinkDirection::Both));
        assert_eq!("OUTLINKS".parse::<LinkDirection>(), Ok(LinkDirection::Outlinks));
        assert_eq!("in".parse::<LinkDirection>(), Ok(LinkDirection::Inlinks));
        assert!("sideways".parse::<LinkDirection>().is_err());
    }

    #[test]
    fn test_direction_serde_names() {
        let json = serde_json::to_string(&LinkDirection::Outlinks).unwrap();
        assert_eq!(json, "\"outlinks\"");
        let kind: NodeKind = serde_json::from_str("\"attachment\"").unwrap();
        assert_eq!(kind, NodeKind::Attachment);
    }
}
