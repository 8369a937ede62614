mod hierarchy;
mod isolation;
mod responsibility;
mod structural;

pub use responsibility::ResponsibilityRule;

use crate::analysis::DependencyGraph;
use crate::classify::PathClassifier;
use crate::config::Config;
use crate::model::{ReferenceEdge, SourceFile, Violation};
use rayon::prelude::*;
use tracing::debug;

/// Hierarchy, Isolation, Responsibility and Structural checks over edges.
/// Shared by analysis and by remediation's safety simulation.
pub struct RuleEngine<'a> {
    responsibility: ResponsibilityRule<'a>,
}

impl<'a> RuleEngine<'a> {
    pub fn new(config: &'a Config, classifier: &'a PathClassifier) -> Self {
        Self {
            responsibility: ResponsibilityRule::new(&config.responsibility, classifier),
        }
    }

    /// Every violation one edge produces; possibly none, possibly several.
    pub fn evaluate_edge(&self, source: &SourceFile, edge: &ReferenceEdge) -> Vec<Violation> {
        let mut violations = Vec::new();
        violations.extend(hierarchy::check(source, edge));
        violations.extend(isolation::check(source, edge));
        violations.extend(self.responsibility.check(source, edge));
        violations.extend(structural::check_edge(edge));
        violations
    }

    /// Violations of one file given its outgoing edges.
    pub fn evaluate_file(&self, source: &SourceFile, edges: &[ReferenceEdge]) -> Vec<Violation> {
        let mut violations: Vec<Violation> = structural::check_file(source).into_iter().collect();
        for edge in edges {
            violations.extend(self.evaluate_edge(source, edge));
        }
        violations
    }

    pub fn evaluate(&self, graph: &DependencyGraph) -> Vec<Violation> {
        let violations: Vec<Violation> = graph
            .files()
            .par_iter()
            .flat_map_iter(|file| self.evaluate_file(file, graph.edges_from(&file.path)))
            .collect();
        debug!(count = violations.len(), "rule evaluation finished");
        violations
    }
}
