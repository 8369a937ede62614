//! Maps paths and reference targets to (layer, module, role).

use crate::config::Config;
use crate::model::{Classification, FileRole, Layer};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Outcome of resolving a raw reference target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Points at a known project file.
    File(PathBuf),
    /// Relative or aliased, but no known file lives there.
    Missing(PathBuf),
    /// A package or other non-project specifier.
    External,
}

pub struct PathClassifier {
    project_root: PathBuf,
    /// Absolute layer roots, deepest first.
    roots: Vec<(Layer, PathBuf)>,
    extensions: Vec<String>,
    aliases: Vec<(String, PathBuf)>,
}

impl PathClassifier {
    /// `project_root` is expected to be absolute and normalized.
    pub fn new(project_root: &Path, config: &Config) -> Self {
        let mut roots: Vec<(Layer, PathBuf)> = config
            .layers
            .iter()
            .map(|(layer, rel)| (layer, normalize(&project_root.join(rel))))
            .collect();
        roots.sort_by(|a, b| b.1.components().count().cmp(&a.1.components().count()));

        let aliases = config
            .aliases
            .iter()
            .map(|(prefix, dir)| (prefix.clone(), normalize(&project_root.join(dir))))
            .collect();

        Self {
            project_root: project_root.to_path_buf(),
            roots,
            extensions: config.extensions.clone(),
            aliases,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Absolute root directory of a layer.
    pub fn root_of(&self, layer: Layer) -> Option<&Path> {
        self.roots
            .iter()
            .find(|(l, _)| *l == layer)
            .map(|(_, p)| p.as_path())
    }

    /// Classify a project file by longest matching layer root.
    pub fn classify(&self, path: &Path) -> Classification {
        let Some((layer, root)) = self.roots.iter().find(|(_, root)| path.starts_with(root)) else {
            return Classification::unknown();
        };

        let module = if *layer == Layer::Module {
            module_name(path, root)
        } else {
            None
        };

        Classification {
            layer: *layer,
            module,
            role: Some(role_of(path)),
        }
    }

    /// Resolve `target` as written in `from` against the set of known files.
    pub fn resolve(&self, from: &Path, target: &str, known: &HashSet<PathBuf>) -> Resolution {
        let base = if target.starts_with("./") || target.starts_with("../") || target == "." || target == ".." {
            let dir = from.parent().unwrap_or(Path::new("/"));
            normalize(&dir.join(target))
        } else if let Some((prefix, dir)) = self.aliases.iter().find(|(p, _)| target.starts_with(p.as_str())) {
            normalize(&dir.join(&target[prefix.len()..]))
        } else {
            return Resolution::External;
        };

        match self.candidates(&base).into_iter().find(|c| known.contains(c)) {
            Some(found) => Resolution::File(found),
            None => Resolution::Missing(base),
        }
    }

    /// Classification of a reference target after resolution.
    pub fn classify_target(&self, resolution: &Resolution) -> Classification {
        match resolution {
            Resolution::File(path) => self.classify(path),
            Resolution::Missing(_) => Classification::unknown(),
            Resolution::External => Classification::external(),
        }
    }

    /// Project-relative path with `/` separators.
    pub fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.project_root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn candidates(&self, base: &Path) -> Vec<PathBuf> {
        let mut out = vec![base.to_path_buf()];
        for ext in &self.extensions {
            let mut with_ext = base.as_os_str().to_owned();
            with_ext.push(".");
            with_ext.push(ext);
            out.push(PathBuf::from(with_ext));
        }
        // ESM sources import `./x.js` for `x.ts`
        if let Some(ext) = base.extension().and_then(|e| e.to_str()) {
            if matches!(ext, "js" | "jsx" | "mjs" | "cjs") {
                for candidate in &self.extensions {
                    out.push(base.with_extension(candidate));
                }
            }
        }
        for ext in &self.extensions {
            out.push(base.join(format!("index.{}", ext)));
        }
        out
    }
}

fn module_name(path: &Path, modules_root: &Path) -> Option<String> {
    let rel = path.strip_prefix(modules_root).ok()?;
    let mut components = rel.components();
    let first = components.next()?;
    // a file directly under the modules root belongs to no module
    components.next()?;
    Some(first.as_os_str().to_string_lossy().to_string())
}

/// Role from filename convention.
pub fn role_of(path: &Path) -> FileRole {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let stem = file_name
        .strip_suffix(extension)
        .map(|s| s.trim_end_matches('.'))
        .unwrap_or(file_name);

    let segments: Vec<&str> = stem.split('.').collect();
    let by_name = segments
        .last()
        .and_then(|s| FileRole::from_name_segment(s))
        .or_else(|| segments.first().and_then(|s| FileRole::from_name_segment(s)));
    if let Some(role) = by_name {
        return role;
    }

    if matches!(extension, "tsx" | "jsx") {
        return FileRole::Ui;
    }

    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|d| d.to_str())
        .and_then(FileRole::from_dir_name)
        .unwrap_or(FileRole::Other)
}

/// Lexically normalize `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
