use super::{FileRole, Layer, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a file of one role may and may not reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleContract {
    /// Source layers the contract applies to.
    pub layers: Vec<Layer>,
    /// When set, a target matching none of `permitted` is a violation.
    pub exhaustive: bool,
    pub permitted: Vec<String>,
    pub forbidden: Vec<ForbiddenTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForbiddenTarget {
    pub pattern: String,
    /// Only targets of this role match.
    #[serde(default)]
    pub role: Option<FileRole>,
    /// Type-only references are exempt.
    #[serde(default)]
    pub value_only: bool,
    #[serde(default = "default_severity")]
    pub severity: Severity,
}

fn default_severity() -> Severity {
    Severity::Medium
}

impl ForbiddenTarget {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            role: None,
            value_only: false,
            severity: default_severity(),
        }
    }

    pub fn value_only(mut self) -> Self {
        self.value_only = true;
        self
    }

    pub fn with_role(mut self, role: FileRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Role → contract lookup. Roles without a contract are unrestricted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ResponsibilityTable {
    pub contracts: BTreeMap<FileRole, RoleContract>,
}

fn transport_targets(severity: Severity, value_only: bool) -> Vec<ForbiddenTarget> {
    ["{core}/transport.*", "{core}/transport/**"]
        .into_iter()
        .map(|p| {
            let target = ForbiddenTarget::new(p).with_severity(severity);
            if value_only { target.value_only() } else { target }
        })
        .collect()
}

fn own_service_values() -> ForbiddenTarget {
    ForbiddenTarget::new("{modules}/{module}/**")
        .with_role(FileRole::Service)
        .value_only()
}

impl RoleContract {
    pub fn ui() -> Self {
        let mut forbidden = transport_targets(Severity::High, false);
        forbidden.push(own_service_values());
        Self {
            layers: default_layers(),
            exhaustive: false,
            permitted: vec!["{modules}/{module}/**".to_string(), "{shared}/ui/**".to_string()],
            forbidden,
        }
    }

    pub fn store() -> Self {
        let mut forbidden = transport_targets(Severity::High, false);
        forbidden.push(own_service_values());
        Self {
            layers: default_layers(),
            exhaustive: false,
            permitted: Vec::new(),
            forbidden,
        }
    }

    /// Index and Other files: no value-level transport access.
    pub fn passive() -> Self {
        Self {
            layers: default_layers(),
            exhaustive: false,
            permitted: Vec::new(),
            forbidden: transport_targets(Severity::Medium, true),
        }
    }
}

fn default_layers() -> Vec<Layer> {
    vec![Layer::Application, Layer::Module]
}

impl ResponsibilityTable {
    pub fn default_contracts() -> Self {
        let mut contracts = BTreeMap::new();
        contracts.insert(FileRole::Ui, RoleContract::ui());
        contracts.insert(FileRole::Store, RoleContract::store());
        contracts.insert(FileRole::Index, RoleContract::passive());
        contracts.insert(FileRole::Other, RoleContract::passive());
        Self { contracts }
    }

    pub fn get(&self, role: FileRole) -> Option<&RoleContract> {
        self.contracts.get(&role)
    }
}

/// Glob matching supporting `**` (whole path segments) and `*` (within one
/// segment). Paths are compared with `/` separators.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    let path = path.replace('\\', "/");
    let pattern = pattern.replace('\\', "/");

    glob_match_recursive(&pattern, &path)
}

fn glob_match_recursive(pattern: &str, path: &str) -> bool {
    if let Some(pos) = pattern.find("**") {
        let prefix = &pattern[..pos];
        let suffix = &pattern[pos + 2..];
        let suffix = suffix.strip_prefix('/').unwrap_or(suffix);

        if !prefix.is_empty() && !glob_match_prefix(prefix, path) {
            return false;
        }

        let remaining = match split_at_prefix(prefix, path) {
            Some(rest) => rest,
            None => return false,
        };

        if suffix.is_empty() {
            return true;
        }

        // `**` consumes zero or more whole segments
        let mut start = 0;
        loop {
            if glob_match_recursive(suffix, &remaining[start..]) {
                return true;
            }
            match remaining[start..].find('/') {
                Some(slash) => start += slash + 1,
                None => return false,
            }
        }
    } else if let Some(pos) = pattern.find('*') {
        let prefix = &pattern[..pos];
        let suffix = &pattern[pos + 1..];

        if !path.starts_with(prefix) {
            return false;
        }

        let remaining = &path[prefix.len()..];

        for (i, c) in remaining.char_indices() {
            if glob_match_recursive(suffix, &remaining[i..]) {
                return true;
            }
            if c == '/' {
                return false;
            }
        }
        glob_match_recursive(suffix, "")
    } else {
        pattern == path
    }
}

/// `prefix` is the literal (possibly `*`-containing) text before a `**`.
fn glob_match_prefix(prefix: &str, path: &str) -> bool {
    split_at_prefix(prefix, path).is_some()
}

fn split_at_prefix<'a>(prefix: &str, path: &'a str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(path);
    }
    let dir = prefix.trim_end_matches('/');
    let segments = dir.split('/').count();
    let mut parts = path.splitn(segments + 1, '/');
    let head: Vec<&str> = parts.by_ref().take(segments).collect();
    if head.len() < segments || !glob_match_recursive(dir, &head.join("/")) {
        return None;
    }
    let rest = parts.next().unwrap_or("");
    Some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("**/fs.ts", "src/fs.ts"));
        assert!(glob_match("**/fs.ts", "src/util/fs.ts"));
        assert!(glob_match("**/fs.ts", "fs.ts"));

        assert!(glob_match("core/**/http.ts", "core/http.ts"));
        assert!(glob_match("core/**/http.ts", "core/transport/http.ts"));
        assert!(glob_match("core/transport/**", "core/transport/a/b.ts"));
        assert!(glob_match("core/transport/**", "core/transport"));

        assert!(glob_match("*.ts", "fs.ts"));
        assert!(glob_match("core/transport.*", "core/transport.ts"));
        assert!(!glob_match("core/transport.*", "core/transport/http.ts"));
        assert!(!glob_match("src/*.ts", "src/util/fs.ts"));

        assert!(glob_match("modules/*/store.ts", "modules/orders/store.ts"));
        assert!(!glob_match("modules/*/store.ts", "modules/orders/ui/store.ts"));
    }

    #[test]
    fn test_double_star_respects_segments() {
        assert!(!glob_match("**/service.ts", "src/userservice.ts"));
        assert!(!glob_match("core/transport/**", "core/transporter/x.ts"));
        assert!(!glob_match("shared/ui/**", "shared/uikit/button.ts"));
    }

    #[test]
    fn test_default_table() {
        let table = ResponsibilityTable::default_contracts();
        assert!(table.get(FileRole::Service).is_none());
        let ui = table.get(FileRole::Ui).unwrap();
        assert!(ui.forbidden.iter().any(|f| f.severity == Severity::High));
        assert!(
            ui.forbidden
                .iter()
                .any(|f| f.role == Some(FileRole::Service) && f.value_only)
        );
    }
}
