use crate::classify::{PathClassifier, Resolution};
use crate::model::{Layer, Reference, ReferenceEdge, SourceFile};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// All files and reference edges of one run. Immutable once built.
pub struct DependencyGraph {
    files: Vec<SourceFile>,
    edges: Vec<ReferenceEdge>,
    /// Edge index range per source file; edges are grouped by `from`.
    outgoing: HashMap<PathBuf, Range<usize>>,
    known: HashSet<PathBuf>,
    /// Resolved file-to-file edges, weighted by index into `edges`.
    graph: DiGraph<PathBuf, usize>,
    node_indices: HashMap<PathBuf, NodeIndex>,
}

/// Turn extracted references of `from` into classified edges.
pub fn resolve_edges(
    from: &Path,
    references: &[Reference],
    classifier: &PathClassifier,
    known: &HashSet<PathBuf>,
) -> Vec<ReferenceEdge> {
    references
        .iter()
        .map(|r| {
            let resolution = classifier.resolve(from, &r.target, known);
            let target = classifier.classify_target(&resolution);
            let resolved = match resolution {
                Resolution::File(path) => Some(path),
                Resolution::Missing(_) | Resolution::External => None,
            };
            ReferenceEdge {
                from: from.to_path_buf(),
                raw_target: r.target.clone(),
                resolved,
                target,
                mode: r.mode,
                kind: r.kind,
                line: r.line,
            }
        })
        .collect()
}

impl DependencyGraph {
    /// Merge per-file results into one graph.
    pub fn build(parts: Vec<(SourceFile, Vec<ReferenceEdge>)>) -> Self {
        let mut parts = parts;
        parts.sort_by(|a, b| a.0.path.cmp(&b.0.path));

        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut files = Vec::with_capacity(parts.len());
        let mut edges = Vec::new();
        let mut outgoing = HashMap::new();

        for (file, _) in &parts {
            let idx = graph.add_node(file.path.clone());
            node_indices.insert(file.path.clone(), idx);
        }

        for (file, mut file_edges) in parts {
            file_edges.sort_by(|a, b| {
                a.line
                    .cmp(&b.line)
                    .then_with(|| a.raw_target.cmp(&b.raw_target))
                    .then_with(|| a.mode.cmp(&b.mode))
            });
            let start = edges.len();
            for edge in file_edges {
                if let Some(target) = &edge.resolved {
                    if let (Some(&from_idx), Some(&to_idx)) =
                        (node_indices.get(&edge.from), node_indices.get(target))
                    {
                        graph.add_edge(from_idx, to_idx, edges.len());
                    }
                }
                edges.push(edge);
            }
            outgoing.insert(file.path.clone(), start..edges.len());
            files.push(file);
        }

        let known = files.iter().map(|f| f.path.clone()).collect();

        Self {
            files,
            edges,
            outgoing,
            known,
            graph,
            node_indices,
        }
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn edges(&self) -> &[ReferenceEdge] {
        &self.edges
    }

    pub fn known_files(&self) -> &HashSet<PathBuf> {
        &self.known
    }

    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        let idx = self
            .files
            .binary_search_by(|f| f.path.as_path().cmp(path))
            .ok()?;
        Some(&self.files[idx])
    }

    pub fn edges_from(&self, path: &Path) -> &[ReferenceEdge] {
        match self.outgoing.get(path) {
            Some(range) => &self.edges[range.clone()],
            None => &[],
        }
    }

    /// Files with a resolved reference into `path`.
    pub fn dependents(&self, path: &Path) -> Vec<&Path> {
        let Some(idx) = self.node_indices.get(path) else {
            return Vec::new();
        };
        let mut out: Vec<&Path> = self
            .graph
            .neighbors_directed(*idx, Direction::Incoming)
            .filter_map(|n| self.graph.node_weight(n).map(|p| p.as_path()))
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Distinct module names, sorted.
    pub fn modules(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .files
            .iter()
            .filter(|f| f.layer == Layer::Module)
            .filter_map(|f| f.module.as_deref())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Module-to-module graph over value edges, self edges dropped.
    pub fn module_graph(&self) -> DiGraphMap<&str, ()> {
        let mut modules = DiGraphMap::new();
        for name in self.modules() {
            modules.add_node(name);
        }
        for edge_ref in self.graph.edge_references() {
            let edge = &self.edges[*edge_ref.weight()];
            if edge.is_type_only() {
                continue;
            }
            let from = self.graph[edge_ref.source()].as_path();
            let (Some(source), Some(target)) = (self.file(from), edge.target.module.as_deref()) else {
                continue;
            };
            if source.layer != Layer::Module || edge.target.layer != Layer::Module {
                continue;
            }
            if let Some(source_module) = source.module.as_deref() {
                if source_module != target {
                    modules.add_edge(source_module, target, ());
                }
            }
        }
        modules
    }

    pub fn unresolved_count(&self) -> usize {
        self.edges.iter().filter(|e| !e.is_resolved()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Classification, FileRole, ReferenceKind, ReferenceMode};

    fn module_file(path: &str, module: &str) -> SourceFile {
        SourceFile::new(
            PathBuf::from(path),
            Classification {
                layer: Layer::Module,
                module: Some(module.to_string()),
                role: Some(FileRole::Other),
            },
        )
    }

    fn edge(from: &str, to: &str, module: &str, mode: ReferenceMode) -> ReferenceEdge {
        ReferenceEdge {
            from: PathBuf::from(from),
            raw_target: to.to_string(),
            resolved: Some(PathBuf::from(to)),
            target: Classification {
                layer: Layer::Module,
                module: Some(module.to_string()),
                role: Some(FileRole::Other),
            },
            mode,
            kind: ReferenceKind::Static,
            line: 1,
        }
    }

    #[test]
    fn test_build_groups_edges_and_modules() {
        let graph = DependencyGraph::build(vec![
            (
                module_file("/p/modules/b/x.ts", "b"),
                vec![edge("/p/modules/b/x.ts", "/p/modules/a/y.ts", "a", ReferenceMode::Type)],
            ),
            (
                module_file("/p/modules/a/y.ts", "a"),
                vec![edge("/p/modules/a/y.ts", "/p/modules/b/x.ts", "b", ReferenceMode::Value)],
            ),
        ]);

        assert_eq!(graph.files()[0].path, PathBuf::from("/p/modules/a/y.ts"));
        assert_eq!(graph.edges_from(Path::new("/p/modules/b/x.ts")).len(), 1);
        assert_eq!(graph.modules(), vec!["a", "b"]);
        assert_eq!(graph.dependents(Path::new("/p/modules/a/y.ts")), vec![Path::new("/p/modules/b/x.ts")]);

        let modules = graph.module_graph();
        assert!(modules.contains_edge("a", "b"));
        // type-only edges carry no runtime coupling
        assert!(!modules.contains_edge("b", "a"));
    }
}
