use super::{Layer, ReferenceEdge};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    pub rule: RuleKind,
    pub severity: Severity,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub subject: Subject,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Hierarchy,
    Isolation,
    Responsibility,
    Cycle,
    Structural,
}

impl RuleKind {
    pub const ALL: [RuleKind; 5] = [
        RuleKind::Hierarchy,
        RuleKind::Isolation,
        RuleKind::Responsibility,
        RuleKind::Cycle,
        RuleKind::Structural,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// What a violation is about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Subject {
    Edge { edge: ReferenceEdge },
    Cycle { modules: Vec<String> },
    File,
}

impl Violation {
    pub fn edge(&self) -> Option<&ReferenceEdge> {
        match &self.subject {
            Subject::Edge { edge } => Some(edge),
            _ => None,
        }
    }

    pub fn cycle(&self) -> Option<&[String]> {
        match &self.subject {
            Subject::Cycle { modules } => Some(modules),
            _ => None,
        }
    }

    pub fn hierarchy(edge: &ReferenceEdge, from_layer: Layer) -> Self {
        Self {
            rule: RuleKind::Hierarchy,
            severity: Severity::High,
            file: edge.from.clone(),
            line: Some(edge.line),
            message: format!(
                "{} layer references upward into {} layer via `{}`",
                from_layer, edge.target.layer, edge.raw_target
            ),
            subject: Subject::Edge { edge: edge.clone() },
        }
    }

    pub fn isolation(edge: &ReferenceEdge, from_module: &str, to_module: &str) -> Self {
        Self {
            rule: RuleKind::Isolation,
            severity: Severity::High,
            file: edge.from.clone(),
            line: Some(edge.line),
            message: format!(
                "Module `{}` has a runtime reference into module `{}` via `{}`",
                from_module, to_module, edge.raw_target
            ),
            subject: Subject::Edge { edge: edge.clone() },
        }
    }

    pub fn responsibility(edge: &ReferenceEdge, severity: Severity, reason: String) -> Self {
        Self {
            rule: RuleKind::Responsibility,
            severity,
            file: edge.from.clone(),
            line: Some(edge.line),
            message: reason,
            subject: Subject::Edge { edge: edge.clone() },
        }
    }

    /// `modules` must already be in canonical rotation.
    pub fn module_cycle(file: PathBuf, modules: Vec<String>) -> Self {
        let mut path = modules.clone();
        if let Some(first) = modules.first() {
            path.push(first.clone());
        }
        Self {
            rule: RuleKind::Cycle,
            severity: Severity::High,
            file,
            line: None,
            message: format!("Module cycle: {}", path.join(" → ")),
            subject: Subject::Cycle { modules },
        }
    }

    pub fn unresolved_reference(edge: &ReferenceEdge) -> Self {
        Self {
            rule: RuleKind::Structural,
            severity: Severity::Low,
            file: edge.from.clone(),
            line: Some(edge.line),
            message: format!("Reference `{}` does not resolve to a known file", edge.raw_target),
            subject: Subject::Edge { edge: edge.clone() },
        }
    }

    pub fn outside_layers(file: PathBuf) -> Self {
        Self {
            rule: RuleKind::Structural,
            severity: Severity::Low,
            message: format!("{} is outside every configured layer root", file.display()),
            file,
            line: None,
            subject: Subject::File,
        }
    }

    /// Key that ignores line numbers, used to tell whether an edit introduces
    /// a violation that was not there before.
    pub fn fingerprint(&self) -> String {
        match &self.subject {
            Subject::Edge { edge } => format!(
                "{:?}|{}|{}|{:?}|{:?}",
                self.rule,
                self.file.display(),
                edge.raw_target,
                edge.mode,
                self.severity
            ),
            Subject::Cycle { modules } => format!("{:?}|{}", self.rule, modules.join(",")),
            Subject::File => format!("{:?}|{}", self.rule, self.file.display()),
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::Hierarchy => write!(f, "hierarchy"),
            RuleKind::Isolation => write!(f, "isolation"),
            RuleKind::Responsibility => write!(f, "responsibility"),
            RuleKind::Cycle => write!(f, "cycle"),
            RuleKind::Structural => write!(f, "structural"),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" | "info" => Ok(Severity::Low),
            "medium" | "warn" | "warning" => Ok(Severity::Medium),
            "high" | "error" => Ok(Severity::High),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}
