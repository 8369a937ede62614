use crate::classify::PathClassifier;
use crate::model::{
    Layer, ReferenceEdge, ResponsibilityTable, RoleContract, Severity, SourceFile, Violation,
    glob_match,
};

/// Layer root placeholders, as project-relative prefixes.
struct Placeholders {
    roots: Vec<(&'static str, String)>,
}

impl Placeholders {
    fn new(classifier: &PathClassifier) -> Self {
        let roots = [
            ("app", Layer::Application),
            ("modules", Layer::Module),
            ("core", Layer::Core),
            ("shared", Layer::Shared),
        ]
        .into_iter()
        .map(|(name, layer)| {
            let rel = classifier
                .root_of(layer)
                .map(|root| classifier.relative(root))
                .unwrap_or_default();
            (name, rel)
        })
        .collect();
        Self { roots }
    }

    /// `None` when the pattern needs `{module}` and the source has none.
    fn expand(&self, pattern: &str, module: Option<&str>) -> Option<String> {
        let mut out = pattern.to_string();
        if out.contains("{module}") {
            out = out.replace("{module}", module?);
        }
        for (name, rel) in &self.roots {
            let key = format!("{{{}}}", name);
            if rel.is_empty() {
                // root is the project root itself
                out = out.replace(&format!("{}/", key), "").replace(&key, "");
            } else {
                out = out.replace(&key, rel);
            }
        }
        Some(out)
    }
}

pub struct ResponsibilityRule<'a> {
    table: &'a ResponsibilityTable,
    classifier: &'a PathClassifier,
    placeholders: Placeholders,
}

impl<'a> ResponsibilityRule<'a> {
    pub fn new(table: &'a ResponsibilityTable, classifier: &'a PathClassifier) -> Self {
        Self {
            table,
            classifier,
            placeholders: Placeholders::new(classifier),
        }
    }

    pub fn check(&self, source: &SourceFile, edge: &ReferenceEdge) -> Vec<Violation> {
        let Some(role) = source.role else {
            return Vec::new();
        };
        let Some(contract) = self.table.get(role) else {
            return Vec::new();
        };
        if !contract.layers.contains(&source.layer) {
            return Vec::new();
        }
        let Some(target) = self.target_key(edge) else {
            return Vec::new();
        };

        let module = source.module.as_deref();
        let mut violations = Vec::new();

        for forbidden in &contract.forbidden {
            if forbidden.value_only && edge.is_type_only() {
                continue;
            }
            if forbidden.role.is_some() && forbidden.role != edge.target.role {
                continue;
            }
            let Some(pattern) = self.placeholders.expand(&forbidden.pattern, module) else {
                continue;
            };
            if glob_match(&pattern, &target) {
                let action = if forbidden.value_only {
                    "holds a runtime reference to"
                } else {
                    "references"
                };
                violations.push(Violation::responsibility(
                    edge,
                    forbidden.severity,
                    format!(
                        "{} file {} `{}` (forbidden by `{}`)",
                        role, action, edge.raw_target, forbidden.pattern
                    ),
                ));
            }
        }

        if contract.exhaustive && !self.is_permitted(contract, &target, module) {
            violations.push(Violation::responsibility(
                edge,
                Severity::Medium,
                format!(
                    "{} file references `{}`, which is outside its permitted targets",
                    role, edge.raw_target
                ),
            ));
        }

        violations
    }

    fn is_permitted(&self, contract: &RoleContract, target: &str, module: Option<&str>) -> bool {
        contract
            .permitted
            .iter()
            .filter_map(|p| self.placeholders.expand(p, module))
            .any(|p| glob_match(&p, target))
    }

    /// Project-relative path of a resolved target, or the raw specifier of an
    /// external one. Unresolved project paths have no key.
    fn target_key(&self, edge: &ReferenceEdge) -> Option<String> {
        match &edge.resolved {
            Some(path) => Some(self.classifier.relative(path)),
            None if edge.target.layer == Layer::External => Some(edge.raw_target.clone()),
            None => None,
        }
    }
}
