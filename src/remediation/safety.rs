use crate::analysis::{Analysis, RuleEngine, resolve_edges};
use crate::config::Config;
use crate::model::{ReferenceKind, Severity, SourceFile, Violation};
use crate::parser::ExtractorRegistry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Re-runs the rule engine over one file's post-fix text and compares the
/// outcome with its pre-fix violations.
pub struct SafetyCheck<'a> {
    analysis: &'a Analysis,
    engine: RuleEngine<'a>,
    registry: &'a ExtractorRegistry,
    reject_severity: Severity,
    known: HashSet<PathBuf>,
}

impl<'a> SafetyCheck<'a> {
    /// `created` are the paths the batch would create; references to them
    /// resolve during simulation.
    pub fn new(
        analysis: &'a Analysis,
        config: &'a Config,
        registry: &'a ExtractorRegistry,
        created: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        let mut known = analysis.graph.known_files().clone();
        known.extend(created);
        Self {
            analysis,
            engine: RuleEngine::new(config, &analysis.classifier),
            registry,
            reject_severity: config.remediation.reject_severity,
            known,
        }
    }

    pub fn engine(&self) -> &RuleEngine<'a> {
        &self.engine
    }

    /// Violations `post_text` at `path` would introduce at or above the
    /// rejection severity.
    pub fn introduced(&self, path: &Path, post_text: &str) -> Result<Vec<Violation>, String> {
        let extractor = self
            .registry
            .find_extractor(path)
            .ok_or_else(|| format!("no extractor for {}", path.display()))?;

        let source = match self.analysis.graph.file(path) {
            Some(file) => file.clone(),
            None => SourceFile::new(path.to_path_buf(), self.analysis.classifier.classify(path)),
        };
        let references = extractor.extract(post_text);
        let post_edges = resolve_edges(path, &references, &self.analysis.classifier, &self.known);
        let post = self.engine.evaluate_file(&source, &post_edges);

        // A file may already hold the same violation; only extra copies are new.
        let mut pre: HashMap<String, usize> = HashMap::new();
        if let Some(file) = self.analysis.graph.file(path) {
            for v in self.engine.evaluate_file(file, self.analysis.graph.edges_from(path)) {
                *pre.entry(v.fingerprint()).or_insert(0) += 1;
            }
        }

        Ok(post
            .into_iter()
            .filter(|v| match pre.get_mut(&v.fingerprint()) {
                Some(count) if *count > 0 => {
                    *count -= 1;
                    false
                }
                _ => v.severity >= self.reject_severity,
            })
            .collect())
    }

    /// `Err(reason)` when the post-fix text must not be written.
    pub fn check(&self, path: &Path, post_text: &str) -> Result<(), String> {
        let introduced = self.introduced(path, post_text)?;
        match introduced.first() {
            Some(v) => Err(format!("would violate architecture: {}", v.message)),
            None => Ok(()),
        }
    }
}

/// Insert `statement` on the line after the last static reference of `text`.
pub fn insert_after_last_import(text: &str, registry: &ExtractorRegistry, path: &Path, statement: &str) -> String {
    let last_end = registry
        .find_extractor(path)
        .map(|e| e.extract(text))
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.kind != ReferenceKind::Dynamic)
        .map(|r| r.span.end)
        .max();

    let mut out = String::with_capacity(text.len() + statement.len() + 2);
    match last_end {
        Some(end) => {
            let line_end = text[end..].find('\n').map(|i| end + i + 1);
            match line_end {
                Some(at) => {
                    out.push_str(&text[..at]);
                    out.push_str(statement);
                    out.push('\n');
                    out.push_str(&text[at..]);
                }
                None => {
                    out.push_str(text);
                    out.push('\n');
                    out.push_str(statement);
                    out.push('\n');
                }
            }
        }
        None => {
            out.push_str(statement);
            out.push('\n');
            out.push_str(text);
        }
    }
    out
}
