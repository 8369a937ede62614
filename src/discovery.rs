use crate::config::Config;
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Fatal discovery failure; aborts the run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Scan root does not exist: {0}")]
    RootNotFound(PathBuf),
    #[error("Scan root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Default)]
pub struct Discovered {
    /// Candidate files, sorted and de-duplicated.
    pub files: Vec<PathBuf>,
    /// Entries that could not be visited.
    pub skipped: Vec<(Option<PathBuf>, String)>,
}

/// Enumerate candidate files under every configured scan root of `project_root`.
pub fn discover(project_root: &Path, config: &Config) -> Result<Discovered, DiscoveryError> {
    let mut files = BTreeSet::new();
    let mut skipped = Vec::new();

    for scan_root in &config.scan_roots {
        let root = crate::classify::normalize(&project_root.join(scan_root));
        if !root.exists() {
            return Err(DiscoveryError::RootNotFound(root));
        }
        if !root.is_dir() {
            return Err(DiscoveryError::NotADirectory(root));
        }

        let exclude = config.exclude.clone();
        let walker = WalkBuilder::new(&root)
            .hidden(true)
            .git_ignore(true)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && entry.depth() > 0 && is_excluded(entry.file_name(), &exclude))
            })
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    skipped.push((None, e.to_string()));
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if has_extension(path, &config.extensions) {
                files.insert(path.to_path_buf());
            }
        }
    }

    debug!(count = files.len(), "discovered candidate files");

    Ok(Discovered {
        files: files.into_iter().collect(),
        skipped,
    })
}

fn is_excluded(name: &std::ffi::OsStr, exclude: &[String]) -> bool {
    let name = name.to_string_lossy();
    exclude.iter().any(|e| e == name.as_ref())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    // declaration files describe types of other files, not dependencies
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.ends_with(".d.ts") {
        return false;
    }
    extensions.iter().any(|e| e == ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discovery_filters_and_prunes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for rel in [
            "modules/orders/ui.ts",
            "modules/orders/notes.md",
            "core/types.d.ts",
            "node_modules/react/index.js",
            "shared/ui/button.tsx",
        ] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }

        let found = discover(root, &Config::default()).unwrap();
        let rel: Vec<_> = found
            .files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["modules/orders/ui.ts", "shared/ui/button.tsx"]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.scan_roots = vec![PathBuf::from("src")];
        assert!(matches!(
            discover(dir.path(), &config),
            Err(DiscoveryError::RootNotFound(_))
        ));
    }
}
