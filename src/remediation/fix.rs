use crate::model::{FileRole, ReferenceMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single proposed edit to the tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposedFix {
    /// Replace the whole text of an existing file.
    Replace {
        path: PathBuf,
        text: String,
        reason: String,
    },
    /// Add a static reference after the file's last top-level import.
    InsertReference {
        path: PathBuf,
        target: String,
        mode: ReferenceMode,
        binding: String,
    },
    /// Create a file from the template provider.
    CreateFile {
        path: PathBuf,
        role: FileRole,
        context: String,
    },
}

impl ProposedFix {
    pub fn path(&self) -> &Path {
        match self {
            ProposedFix::Replace { path, .. }
            | ProposedFix::InsertReference { path, .. }
            | ProposedFix::CreateFile { path, .. } => path,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ProposedFix::Replace { reason, .. } => reason.clone(),
            ProposedFix::InsertReference {
                target, mode, binding, ..
            } => format!("insert {} reference `{}` from `{}`", mode, binding, target),
            ProposedFix::CreateFile { role, context, .. } => {
                format!("create missing {} file for `{}`", role, context)
            }
        }
    }
}

/// Where a fix stands in Proposed → SafetyChecked → {Applied | Rejected}.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FixState {
    Proposed,
    SafetyChecked,
    Applied,
    Rejected { reason: String },
    /// Written, then undone by the regression rollback.
    RolledBack,
}

impl FixState {
    pub fn is_rejected(&self) -> bool {
        matches!(self, FixState::Rejected { .. })
    }
}

impl std::fmt::Display for FixState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixState::Proposed => write!(f, "proposed"),
            FixState::SafetyChecked => write!(f, "safety-checked"),
            FixState::Applied => write!(f, "applied"),
            FixState::Rejected { reason } => write!(f, "rejected ({})", reason),
            FixState::RolledBack => write!(f, "rolled back"),
        }
    }
}
