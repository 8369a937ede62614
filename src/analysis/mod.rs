mod circular;
mod graph;
pub mod rules;

pub use circular::{detect_module_cycles, find_cycles};
pub use graph::{DependencyGraph, resolve_edges};
pub use rules::RuleEngine;

use crate::classify::{PathClassifier, normalize};
use crate::config::Config;
use crate::discovery::{DiscoveryError, discover};
use crate::fs::FileSystem;
use crate::model::{Layer, ReferenceEdge, SourceFile};
use crate::parser::{ExtractionError, ExtractorRegistry};
use crate::report::{ErrorStage, RecordedError, Report, Stats};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything one run produced. Remediation keeps the graph and classifier
/// around to simulate fixes.
pub struct Analysis {
    pub classifier: PathClassifier,
    pub graph: DependencyGraph,
    pub report: Report,
}

pub fn analyze(
    path: &Path,
    config: &Config,
    registry: &ExtractorRegistry,
    fs: &dyn FileSystem,
) -> Result<Report, DiscoveryError> {
    run(path, config, registry, fs).map(|analysis| analysis.report)
}

pub fn run(
    path: &Path,
    config: &Config,
    registry: &ExtractorRegistry,
    fs: &dyn FileSystem,
) -> Result<Analysis, DiscoveryError> {
    let project_root = normalize(path);
    let discovered = discover(&project_root, config)?;
    let errors = discovered
        .skipped
        .into_iter()
        .map(|(path, message)| RecordedError {
            stage: ErrorStage::Discovery,
            path,
            message,
        })
        .collect();
    Ok(analyze_files(
        &project_root,
        discovered.files,
        errors,
        config,
        registry,
        fs,
    ))
}

/// Analyze an already discovered file set. All reads go through `fs`.
pub fn analyze_files(
    project_root: &Path,
    files: Vec<PathBuf>,
    mut errors: Vec<RecordedError>,
    config: &Config,
    registry: &ExtractorRegistry,
    fs: &dyn FileSystem,
) -> Analysis {
    let project_name = project_root
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("project")
        .to_string();
    let classifier = PathClassifier::new(project_root, config);
    let known: HashSet<PathBuf> = files.iter().cloned().collect();

    // Per-file extraction and classification; `collect` is the only join.
    let results: Vec<Result<(SourceFile, Vec<ReferenceEdge>), ExtractionError>> = files
        .par_iter()
        .map(|file| {
            let references = registry.extract_file(file, fs)?;
            let source = SourceFile::new(file.clone(), classifier.classify(file));
            let edges = resolve_edges(file, &references, &classifier, &known);
            Ok((source, edges))
        })
        .collect();

    let mut parts = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(part) => parts.push(part),
            Err(e) => {
                warn!(error = %e, "skipping file");
                let path = match &e {
                    ExtractionError::Io { path, .. } | ExtractionError::Unsupported(path) => path.clone(),
                };
                errors.push(RecordedError {
                    stage: ErrorStage::Extraction,
                    path: Some(path),
                    message: e.to_string(),
                });
            }
        }
    }

    let graph = DependencyGraph::build(parts);
    debug!(
        files = graph.files().len(),
        edges = graph.edges().len(),
        "dependency graph built"
    );

    let engine = RuleEngine::new(config, &classifier);
    let modules_root = classifier.root_of(Layer::Module).map(Path::to_path_buf);
    let (mut violations, cycles) = rayon::join(
        || engine.evaluate(&graph),
        || detect_module_cycles(&graph, modules_root),
    );
    violations.extend(cycles);

    let stats = Stats {
        files: graph.files().len(),
        edges: graph.edges().len(),
        unresolved_edges: graph.unresolved_count(),
        modules: graph.modules().len(),
    };
    let report = Report::new(project_name, violations, stats, errors);
    info!(
        verdict = %report.verdict,
        violations = report.summary.total,
        "analysis finished"
    );

    Analysis {
        classifier,
        graph,
        report,
    }
}
