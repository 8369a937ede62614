use super::ProposedFix;
use crate::analysis::{Analysis, RuleEngine};
use crate::config::Config;
use crate::fs::FileSystem;
use crate::model::{FileRole, Layer, ReferenceKind, ReferenceMode, RuleKind, Violation};
use crate::parser::ExtractorRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::path::PathBuf;

/// A violation that got no automatic fix, and why.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedViolation {
    pub rule: RuleKind,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub message: String,
    pub reason: String,
}

impl SkippedViolation {
    fn new(violation: &Violation, reason: impl Into<String>) -> Self {
        Self {
            rule: violation.rule,
            file: violation.file.clone(),
            line: violation.line,
            message: violation.message.clone(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Proposals {
    pub fixes: Vec<ProposedFix>,
    pub skipped: Vec<SkippedViolation>,
}

/// Value references flagged by Isolation or Responsibility become one
/// `Replace` per file that demotes each flagged statement to type-only.
pub fn from_violations(
    violations: &[Violation],
    analysis: &Analysis,
    engine: &RuleEngine,
    registry: &ExtractorRegistry,
    fs: &dyn FileSystem,
) -> Proposals {
    let mut proposals = Proposals::default();
    let mut by_file: BTreeMap<PathBuf, Vec<&Violation>> = BTreeMap::new();

    for violation in violations {
        match demotable(violation, analysis, engine) {
            Ok(()) => by_file.entry(violation.file.clone()).or_default().push(violation),
            Err(reason) => proposals.skipped.push(SkippedViolation::new(violation, reason)),
        }
    }

    for (path, flagged) in by_file {
        let text = match fs.read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                for v in flagged {
                    proposals
                        .skipped
                        .push(SkippedViolation::new(v, format!("cannot read file: {}", e)));
                }
                continue;
            }
        };
        let Some(extractor) = registry.find_extractor(&path) else {
            for v in flagged {
                proposals.skipped.push(SkippedViolation::new(v, "no extractor for file"));
            }
            continue;
        };
        let references = extractor.extract(&text);

        // Isolation and Responsibility may flag the same statement.
        let mut spans: BTreeMap<usize, Range<usize>> = BTreeMap::new();
        let mut targets = BTreeSet::new();
        for v in flagged {
            let Some(edge) = v.edge() else { continue };
            let found = references.iter().find(|r| {
                r.line == edge.line && r.target == edge.raw_target && r.mode == edge.mode && r.kind == edge.kind
            });
            let Some(reference) = found else {
                proposals
                    .skipped
                    .push(SkippedViolation::new(v, "reference statement not found in current text"));
                continue;
            };
            if extractor.demote_to_type_only(&text[reference.span.clone()]).is_none() {
                proposals
                    .skipped
                    .push(SkippedViolation::new(v, "statement has no type-only form"));
                continue;
            }
            spans.insert(reference.span.start, reference.span.clone());
            targets.insert(edge.raw_target.clone());
        }
        if spans.is_empty() {
            continue;
        }

        let mut new_text = text.clone();
        for span in spans.values().rev() {
            if let Some(demoted) = extractor.demote_to_type_only(&text[span.clone()]) {
                new_text.replace_range(span.clone(), &demoted);
            }
        }
        let targets: Vec<String> = targets.into_iter().map(|t| format!("`{}`", t)).collect();
        proposals.fixes.push(ProposedFix::Replace {
            path,
            text: new_text,
            reason: format!("demote {} to type-only", targets.join(", ")),
        });
    }

    proposals
}

fn demotable(violation: &Violation, analysis: &Analysis, engine: &RuleEngine) -> Result<(), String> {
    if !matches!(violation.rule, RuleKind::Isolation | RuleKind::Responsibility) {
        return Err(format!("no automatic fix for {} violations", violation.rule));
    }
    let Some(edge) = violation.edge() else {
        return Err("violation is not tied to a reference".to_string());
    };
    if edge.is_type_only() {
        return Err("reference is already type-only".to_string());
    }
    if edge.kind == ReferenceKind::Dynamic {
        return Err("dynamic references have no type-only form".to_string());
    }
    let Some(source) = analysis.graph.file(&edge.from) else {
        return Err("source file is not part of the analysis".to_string());
    };
    let mut demoted = edge.clone();
    demoted.mode = ReferenceMode::Type;
    if engine
        .evaluate_edge(source, &demoted)
        .iter()
        .any(|d| d.rule == violation.rule)
    {
        return Err("a type-only reference would still violate this rule".to_string());
    }
    Ok(())
}

/// One `CreateFile` per module and required role the module lacks.
pub fn missing_artifacts(analysis: &Analysis, config: &Config) -> Vec<ProposedFix> {
    let Some(modules_root) = analysis.classifier.root_of(Layer::Module) else {
        return Vec::new();
    };
    let extension = config.extensions.first().map(String::as_str).unwrap_or("ts");
    let files = analysis.graph.files();

    let mut fixes = Vec::new();
    for module in analysis.graph.modules() {
        for role in &config.remediation.required {
            let present = files.iter().any(|f| {
                f.layer == Layer::Module && f.module.as_deref() == Some(module) && f.role == Some(*role)
            });
            if present {
                continue;
            }
            fixes.push(ProposedFix::CreateFile {
                path: modules_root.join(module).join(artifact_name(*role, extension)),
                role: *role,
                context: module.to_string(),
            });
        }
    }
    fixes
}

fn artifact_name(role: FileRole, extension: &str) -> String {
    format!("{}.{}", role.as_str(), extension)
}
