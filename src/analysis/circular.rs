use crate::analysis::DependencyGraph;
use crate::model::{Layer, Violation};
use petgraph::graphmap::DiGraphMap;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

/// Module-level reference cycles, one violation per distinct cycle.
pub fn detect_module_cycles(graph: &DependencyGraph, modules_root: Option<PathBuf>) -> Vec<Violation> {
    let modules = graph.module_graph();

    find_cycles(&modules)
        .into_iter()
        .map(|cycle| {
            let file = graph
                .files()
                .iter()
                .find(|f| f.layer == Layer::Module && f.module.as_deref() == Some(cycle[0].as_str()))
                .map(|f| f.path.clone())
                .or_else(|| modules_root.as_ref().map(|root| root.join(&cycle[0])))
                .unwrap_or_else(|| PathBuf::from(&cycle[0]));
            Violation::module_cycle(file, cycle)
        })
        .collect()
}

/// Depth-first search with recursion-stack membership. Nodes and neighbours
/// are visited in sorted order; cycles come back rotated to their smallest
/// member and de-duplicated.
pub fn find_cycles(graph: &DiGraphMap<&str, ()>) -> Vec<Vec<String>> {
    let mut nodes: Vec<&str> = graph.nodes().collect();
    nodes.sort_unstable();

    let mut search = CycleSearch {
        graph,
        visited: HashSet::new(),
        stack: Vec::new(),
        on_stack: HashSet::new(),
        found: BTreeSet::new(),
    };
    for node in nodes {
        if !search.visited.contains(node) {
            search.visit(node);
        }
    }
    search.found.into_iter().collect()
}

struct CycleSearch<'g, 'a> {
    graph: &'g DiGraphMap<&'a str, ()>,
    visited: HashSet<&'a str>,
    stack: Vec<&'a str>,
    on_stack: HashSet<&'a str>,
    found: BTreeSet<Vec<String>>,
}

impl<'g, 'a> CycleSearch<'g, 'a> {
    fn visit(&mut self, node: &'a str) {
        self.visited.insert(node);
        self.stack.push(node);
        self.on_stack.insert(node);

        let mut next: Vec<&'a str> = self.graph.neighbors(node).collect();
        next.sort_unstable();
        for neighbour in next {
            if self.on_stack.contains(neighbour) {
                if let Some(pos) = self.stack.iter().position(|n| *n == neighbour) {
                    self.found.insert(canonical(&self.stack[pos..]));
                }
            } else if !self.visited.contains(neighbour) {
                self.visit(neighbour);
            }
        }

        self.stack.pop();
        self.on_stack.remove(node);
    }
}

fn canonical(cycle: &[&str]) -> Vec<String> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, name)| **name)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    cycle[start..]
        .iter()
        .chain(&cycle[..start])
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of<'a>(edges: &[(&'a str, &'a str)]) -> DiGraphMap<&'a str, ()> {
        let mut graph = DiGraphMap::new();
        for (a, b) in edges {
            graph.add_edge(*a, *b, ());
        }
        graph
    }

    #[test]
    fn test_single_cycle_is_canonical() {
        let cycles = find_cycles(&graph_of(&[("c", "a"), ("a", "b"), ("b", "c")]));
        assert_eq!(cycles, vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]]);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let forward = find_cycles(&graph_of(&[("a", "b"), ("b", "c"), ("c", "a")]));
        let backward = find_cycles(&graph_of(&[("c", "a"), ("b", "c"), ("a", "b")]));
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 1);
    }

    #[test]
    fn test_acyclic_and_two_cycles() {
        assert!(find_cycles(&graph_of(&[("a", "b"), ("b", "c"), ("a", "c")])).is_empty());

        let cycles = find_cycles(&graph_of(&[("a", "b"), ("b", "a"), ("c", "d"), ("d", "c")]));
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0], vec!["a", "b"]);
        assert_eq!(cycles[1], vec!["c", "d"]);
    }

    #[test]
    fn test_cycle_message() {
        let v = Violation::module_cycle(PathBuf::from("/p/modules/a/x.ts"), vec!["a".into(), "b".into()]);
        assert_eq!(v.message, "Module cycle: a → b → a");
    }
}
