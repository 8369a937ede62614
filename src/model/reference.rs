use super::Classification;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

/// Whether a reference carries runtime coupling or only compile-time types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceMode {
    Value,
    Type,
}

impl ReferenceMode {
    pub fn is_type_only(self) -> bool {
        self == ReferenceMode::Type
    }
}

impl std::fmt::Display for ReferenceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceMode::Value => write!(f, "value"),
            ReferenceMode::Type => write!(f, "type-only"),
        }
    }
}

/// Syntactic form a reference was written in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    /// `import … from "x"` or `import "x"`
    Static,
    /// `import("x")` or `require("x")`
    Dynamic,
    /// `export … from "x"`
    ReExport,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Static => write!(f, "import"),
            ReferenceKind::Dynamic => write!(f, "dynamic import"),
            ReferenceKind::ReExport => write!(f, "re-export"),
        }
    }
}

/// A dependency-reference statement as found in a file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub target: String,
    pub mode: ReferenceMode,
    pub kind: ReferenceKind,
    pub line: usize,
    /// Byte range of the whole statement in the source text.
    pub span: Range<usize>,
}

/// A reference after resolution and classification of its target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ReferenceEdge {
    pub from: PathBuf,
    pub raw_target: String,
    pub resolved: Option<PathBuf>,
    pub target: Classification,
    pub mode: ReferenceMode,
    pub kind: ReferenceKind,
    pub line: usize,
}

impl ReferenceEdge {
    pub fn is_type_only(&self) -> bool {
        self.mode.is_type_only()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}
