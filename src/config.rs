use crate::model::{FileRole, ForbiddenTarget, Layer, ResponsibilityTable, RoleContract, Severity};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = ".layerguard.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Directories to scan, relative to the project root.
    pub scan_roots: Vec<PathBuf>,
    pub extensions: Vec<String>,
    /// Directory names pruned during discovery.
    pub exclude: Vec<String>,
    pub layers: LayerRoots,
    /// Non-relative specifier prefixes that map into the project, longest first.
    pub aliases: Vec<(String, PathBuf)>,
    pub responsibility: ResponsibilityTable,
    pub remediation: RemediationSettings,
}

/// Layer roots, relative to the project root.
#[derive(Debug, Clone)]
pub struct LayerRoots {
    pub application: PathBuf,
    pub modules: PathBuf,
    pub core: PathBuf,
    pub shared: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RemediationSettings {
    /// Roll back an apply when post-fix High count exceeds this multiple of
    /// the pre-fix count.
    pub rollback_factor: f64,
    /// Fixes that introduce a violation at or above this severity are rejected.
    pub reject_severity: Severity,
    /// Roles every module is expected to contain.
    pub required: Vec<FileRole>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    scan_roots: Option<Vec<String>>,
    extensions: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    layers: Option<RawLayers>,
    aliases: Option<HashMap<String, String>>,
    responsibility: Option<HashMap<String, RawContract>>,
    remediation: Option<RawRemediation>,
}

#[derive(Debug, Deserialize)]
struct RawLayers {
    application: Option<String>,
    modules: Option<String>,
    core: Option<String>,
    shared: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawContract {
    layers: Option<Vec<String>>,
    exhaustive: Option<bool>,
    permitted: Option<Vec<String>>,
    forbidden: Option<Vec<RawForbidden>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawForbidden {
    Pattern(String),
    Detailed {
        pattern: String,
        role: Option<String>,
        value_only: Option<bool>,
        severity: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct RawRemediation {
    rollback_factor: Option<f64>,
    reject_severity: Option<String>,
    required: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_roots: vec![PathBuf::from(".")],
            extensions: ["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude: ["node_modules", "dist", "build", ".git", "coverage"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            layers: LayerRoots::default(),
            aliases: Vec::new(),
            responsibility: ResponsibilityTable::default_contracts(),
            remediation: RemediationSettings::default(),
        }
    }
}

impl Default for LayerRoots {
    fn default() -> Self {
        Self {
            application: PathBuf::from("app"),
            modules: PathBuf::from("modules"),
            core: PathBuf::from("core"),
            shared: PathBuf::from("shared"),
        }
    }
}

impl Default for RemediationSettings {
    fn default() -> Self {
        Self {
            rollback_factor: 1.5,
            reject_severity: Severity::Medium,
            required: vec![FileRole::Index],
        }
    }
}

impl LayerRoots {
    pub fn iter(&self) -> impl Iterator<Item = (Layer, &Path)> {
        [
            (Layer::Application, self.application.as_path()),
            (Layer::Module, self.modules.as_path()),
            (Layer::Core, self.core.as_path()),
            (Layer::Shared, self.shared.as_path()),
        ]
        .into_iter()
    }
}

impl Config {
    pub fn load(project_path: &Path) -> Result<Self, ConfigError> {
        let config_path = project_path.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let layers = match raw.layers {
            Some(l) => LayerRoots {
                application: l.application.map(PathBuf::from).unwrap_or(defaults.layers.application),
                modules: l.modules.map(PathBuf::from).unwrap_or(defaults.layers.modules),
                core: l.core.map(PathBuf::from).unwrap_or(defaults.layers.core),
                shared: l.shared.map(PathBuf::from).unwrap_or(defaults.layers.shared),
            },
            None => defaults.layers,
        };

        let mut aliases: Vec<(String, PathBuf)> = raw
            .aliases
            .unwrap_or_default()
            .into_iter()
            .map(|(prefix, dir)| (prefix, PathBuf::from(dir)))
            .collect();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let mut responsibility = defaults.responsibility;
        if let Some(map) = raw.responsibility {
            for (key, raw_contract) in map {
                let role: FileRole = key.parse().map_err(ConfigError::Invalid)?;
                let base = responsibility
                    .contracts
                    .remove(&role)
                    .unwrap_or_else(|| RoleContract {
                        layers: vec![Layer::Application, Layer::Module],
                        exhaustive: false,
                        permitted: Vec::new(),
                        forbidden: Vec::new(),
                    });
                responsibility
                    .contracts
                    .insert(role, merge_contract(base, raw_contract)?);
            }
        }

        let remediation = match raw.remediation {
            Some(r) => {
                let required = match r.required {
                    Some(list) => list
                        .iter()
                        .map(|s| s.parse::<FileRole>().map_err(ConfigError::Invalid))
                        .collect::<Result<Vec<_>, _>>()?,
                    None => defaults.remediation.required,
                };
                let reject_severity = match r.reject_severity {
                    Some(s) => s.parse().map_err(ConfigError::Invalid)?,
                    None => defaults.remediation.reject_severity,
                };
                let rollback_factor = r
                    .rollback_factor
                    .unwrap_or(defaults.remediation.rollback_factor);
                if rollback_factor < 1.0 {
                    return Err(ConfigError::Invalid(format!(
                        "rollback_factor must be at least 1.0, got {}",
                        rollback_factor
                    )));
                }
                RemediationSettings {
                    rollback_factor,
                    reject_severity,
                    required,
                }
            }
            None => defaults.remediation,
        };

        Ok(Self {
            scan_roots: raw
                .scan_roots
                .map(|roots| roots.into_iter().map(PathBuf::from).collect())
                .unwrap_or(defaults.scan_roots),
            extensions: raw
                .extensions
                .map(|exts| {
                    exts.into_iter()
                        .map(|e| e.trim_start_matches('.').to_string())
                        .collect()
                })
                .unwrap_or(defaults.extensions),
            exclude: raw.exclude.unwrap_or(defaults.exclude),
            layers,
            aliases,
            responsibility,
            remediation,
        })
    }
}

fn merge_contract(base: RoleContract, raw: RawContract) -> Result<RoleContract, ConfigError> {
    let layers = match raw.layers {
        Some(list) => list
            .iter()
            .map(|s| s.parse::<Layer>().map_err(ConfigError::Invalid))
            .collect::<Result<Vec<_>, _>>()?,
        None => base.layers,
    };

    let forbidden = match raw.forbidden {
        Some(list) => list
            .into_iter()
            .map(convert_forbidden)
            .collect::<Result<Vec<_>, _>>()?,
        None => base.forbidden,
    };

    Ok(RoleContract {
        layers,
        exhaustive: raw.exhaustive.unwrap_or(base.exhaustive),
        permitted: raw.permitted.unwrap_or(base.permitted),
        forbidden,
    })
}

fn convert_forbidden(raw: RawForbidden) -> Result<ForbiddenTarget, ConfigError> {
    match raw {
        RawForbidden::Pattern(pattern) => Ok(ForbiddenTarget::new(&pattern)),
        RawForbidden::Detailed {
            pattern,
            role,
            value_only,
            severity,
        } => {
            let mut target = ForbiddenTarget::new(&pattern);
            if let Some(role) = role {
                target = target.with_role(role.parse().map_err(ConfigError::Invalid)?);
            }
            if value_only.unwrap_or(false) {
                target = target.value_only();
            }
            if let Some(severity) = severity {
                target = target.with_severity(severity.parse().map_err(ConfigError::Invalid)?);
            }
            Ok(target)
        }
    }
}

/// Commented starter configuration written by `layerguard init`.
pub fn generate_config_template() -> String {
    r#"# layerguard configuration
# Every setting is optional; the values shown are the defaults.

# Directories to scan, relative to this file.
scan_roots = ["."]
extensions = ["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"]
# Directory names skipped during discovery.
exclude = ["node_modules", "dist", "build", ".git", "coverage"]

# Layer roots. Order: application > modules > core > shared.
# A file may reference its own layer or any layer below it.
[layers]
application = "app"
modules = "modules"
core = "core"
shared = "shared"

# Non-relative import prefixes that point into the project.
[aliases]
# "@/" = "src/"

# Responsibility contracts, keyed by file role (ui, store, service, index, other).
# Patterns are globs over project-relative paths and may use the placeholders
# {app} {modules} {core} {shared} and {module} (the referencing file's module).
#
# [responsibility.ui]
# layers = ["application", "module"]
# exhaustive = false
# permitted = ["{modules}/{module}/**", "{shared}/ui/**"]
# forbidden = [
#   { pattern = "{core}/transport/**", severity = "high" },
#   { pattern = "{modules}/{module}/**", role = "service", value_only = true },
# ]

[remediation]
# Roll back an applied batch when High violations grow beyond this factor.
rollback_factor = 1.5
# Proposed fixes introducing a violation of this severity or worse are rejected.
reject_severity = "medium"
# Roles every module must provide; missing ones can be scaffolded by `fix --missing`.
required = ["index"]
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = Config::from_toml(&generate_config_template()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.extensions, defaults.extensions);
        assert_eq!(config.layers.modules, defaults.layers.modules);
        assert_eq!(config.responsibility, defaults.responsibility);
        assert_eq!(config.remediation.required, vec![FileRole::Index]);
    }

    #[test]
    fn test_overrides_merge_over_defaults() {
        let config = Config::from_toml(
            r#"
            extensions = [".ts"]

            [layers]
            modules = "src/features"

            [aliases]
            "@/" = "src/"
            "@core/" = "src/core/"

            [responsibility.service]
            forbidden = ["{shared}/ui/**"]

            [responsibility.ui]
            exhaustive = true

            [remediation]
            reject_severity = "high"
            "#,
        )
        .unwrap();

        assert_eq!(config.extensions, vec!["ts".to_string()]);
        assert_eq!(config.layers.modules, PathBuf::from("src/features"));
        assert_eq!(config.layers.core, PathBuf::from("core"));
        assert_eq!(config.aliases[0].0, "@core/");

        let service = config.responsibility.get(FileRole::Service).unwrap();
        assert_eq!(service.forbidden.len(), 1);
        assert_eq!(service.forbidden[0].severity, Severity::Medium);

        let ui = config.responsibility.get(FileRole::Ui).unwrap();
        assert!(ui.exhaustive);
        assert_eq!(ui.forbidden, RoleContract::ui().forbidden);

        assert_eq!(config.remediation.reject_severity, Severity::High);
        assert_eq!(config.remediation.rollback_factor, 1.5);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_toml("[responsibility.widget]\nexhaustive = true"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("[remediation]\nrollback_factor = 0.5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("extensions = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
