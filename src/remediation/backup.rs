use crate::fs::FileSystem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Failed to back up {path}: {source}")]
    Capture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write backup bundle {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read backup bundle {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed backup bundle: {0}")]
    Format(#[from] serde_json::Error),
}

/// Original state of every file one apply batch touches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupBundle {
    pub created_at: DateTime<Utc>,
    pub entries: Vec<BackupEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupEntry {
    pub path: PathBuf,
    /// `None` for files the batch creates; restoring removes them.
    pub original: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RestoreSummary {
    pub restored: usize,
    pub removed: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl BackupBundle {
    /// Snapshot `paths`. Any unreadable existing file fails the whole capture.
    pub fn capture<'p>(
        paths: impl IntoIterator<Item = &'p Path>,
        fs: &dyn FileSystem,
    ) -> Result<Self, BackupError> {
        let mut entries = Vec::new();
        for path in paths {
            let original = if fs.exists(path) {
                let text = fs.read_to_string(path).map_err(|source| BackupError::Capture {
                    path: path.to_path_buf(),
                    source,
                })?;
                Some(text)
            } else {
                None
            };
            entries.push(BackupEntry {
                path: path.to_path_buf(),
                original,
            });
        }
        Ok(Self {
            created_at: Utc::now(),
            entries,
        })
    }

    pub fn file_name(&self) -> String {
        format!("backup-{}.json", self.created_at.format("%Y%m%dT%H%M%S%3fZ"))
    }

    /// Write the bundle into `dir`, returning its path.
    pub fn save(&self, dir: &Path, fs: &dyn FileSystem) -> Result<PathBuf, BackupError> {
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self)?;
        fs.write(&path, &json).map_err(|source| BackupError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), files = self.entries.len(), "backup bundle written");
        Ok(path)
    }

    pub fn load(path: &Path, fs: &dyn FileSystem) -> Result<Self, BackupError> {
        let json = fs.read_to_string(path).map_err(|source| BackupError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Put every entry back. Failures are collected, never short-circuit.
    pub fn restore(&self, fs: &dyn FileSystem) -> RestoreSummary {
        let mut summary = RestoreSummary::default();
        for entry in &self.entries {
            let result = match &entry.original {
                Some(text) => fs.write(&entry.path, text).map(|_| summary.restored += 1),
                None if fs.exists(&entry.path) => {
                    fs.remove_file(&entry.path).map(|_| summary.removed += 1)
                }
                None => Ok(()),
            };
            if let Err(e) = result {
                warn!(path = %entry.path.display(), error = %e, "restore failed");
                summary.failures.push((entry.path.clone(), e.to_string()));
            }
        }
        summary
    }
}
