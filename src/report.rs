//! Aggregation of violations into a render-agnostic result.

use crate::model::{RuleKind, Severity, Violation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Warn => write!(f, "WARN"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_rule: BTreeMap<RuleKind, usize>,
    /// Indices into the report's violation list, per file.
    pub by_file: BTreeMap<PathBuf, Vec<usize>>,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStage {
    Discovery,
    Extraction,
}

/// A per-file failure that did not abort the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedError {
    pub stage: ErrorStage,
    pub path: Option<PathBuf>,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    pub files: usize,
    pub edges: usize,
    pub unresolved_edges: usize,
    pub modules: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub project_name: String,
    pub verdict: Verdict,
    pub violations: Vec<Violation>,
    pub summary: Summary,
    pub stats: Stats,
    pub errors: Vec<RecordedError>,
}

impl Report {
    pub fn new(
        project_name: String,
        mut violations: Vec<Violation>,
        stats: Stats,
        errors: Vec<RecordedError>,
    ) -> Self {
        sort_violations(&mut violations);
        let summary = summarize(&violations);
        Self {
            project_name,
            verdict: summary.verdict,
            violations,
            summary,
            stats,
            errors,
        }
    }

    pub fn high_count(&self) -> usize {
        self.summary
            .by_severity
            .get(&Severity::High)
            .copied()
            .unwrap_or(0)
    }

    pub fn count(&self, rule: RuleKind) -> usize {
        self.summary.by_rule.get(&rule).copied().unwrap_or(0)
    }
}

/// Deterministic order: file, line, rule, message.
pub fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then_with(|| a.line.cmp(&b.line))
            .then_with(|| a.rule.cmp(&b.rule))
            .then_with(|| b.severity.cmp(&a.severity))
            .then_with(|| a.message.cmp(&b.message))
    });
}

pub fn verdict_of(violations: &[Violation]) -> Verdict {
    if violations.iter().any(|v| v.severity == Severity::High) {
        Verdict::Fail
    } else if violations.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Warn
    }
}

pub fn summarize(violations: &[Violation]) -> Summary {
    let mut by_severity = BTreeMap::new();
    let mut by_rule = BTreeMap::new();
    let mut by_file: BTreeMap<PathBuf, Vec<usize>> = BTreeMap::new();

    for (idx, v) in violations.iter().enumerate() {
        *by_severity.entry(v.severity).or_insert(0) += 1;
        *by_rule.entry(v.rule).or_insert(0) += 1;
        by_file.entry(v.file.clone()).or_default().push(idx);
    }

    Summary {
        total: violations.len(),
        by_severity,
        by_rule,
        by_file,
        verdict: verdict_of(violations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Subject;

    fn violation(file: &str, line: usize, rule: RuleKind, severity: Severity) -> Violation {
        Violation {
            rule,
            severity,
            file: PathBuf::from(file),
            line: Some(line),
            subject: Subject::File,
            message: format!("{} at {}", rule, line),
        }
    }

    #[test]
    fn test_verdicts() {
        assert_eq!(verdict_of(&[]), Verdict::Pass);
        assert_eq!(
            verdict_of(&[violation("/a.ts", 1, RuleKind::Structural, Severity::Low)]),
            Verdict::Warn
        );
        assert_eq!(
            verdict_of(&[
                violation("/a.ts", 1, RuleKind::Responsibility, Severity::Medium),
                violation("/a.ts", 2, RuleKind::Isolation, Severity::High),
            ]),
            Verdict::Fail
        );
    }

    #[test]
    fn test_report_sorts_and_counts() {
        let report = Report::new(
            "demo".to_string(),
            vec![
                violation("/b.ts", 3, RuleKind::Hierarchy, Severity::High),
                violation("/a.ts", 9, RuleKind::Isolation, Severity::High),
                violation("/a.ts", 2, RuleKind::Responsibility, Severity::Medium),
            ],
            Stats::default(),
            Vec::new(),
        );

        let order: Vec<_> = report
            .violations
            .iter()
            .map(|v| (v.file.display().to_string(), v.line))
            .collect();
        assert_eq!(
            order,
            vec![
                ("/a.ts".to_string(), Some(2)),
                ("/a.ts".to_string(), Some(9)),
                ("/b.ts".to_string(), Some(3)),
            ]
        );
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.high_count(), 2);
        assert_eq!(report.count(RuleKind::Isolation), 1);
        assert_eq!(report.summary.by_file[&PathBuf::from("/a.ts")], vec![0, 1]);
    }
}
