//! Library API for layerguard.
//!
//! Unlike the CLI commands which print output and return exit codes, these
//! functions return `Result` types that calling code can handle.
//!
//! # Example
//!
//! ```no_run
//! use layerguard::{check, CheckOptions, Verdict};
//! use std::path::Path;
//!
//! let report = check(Path::new("."), CheckOptions::default())?;
//! if report.verdict == Verdict::Fail {
//!     for v in &report.violations {
//!         println!("{}: {}", v.file.display(), v.message);
//!     }
//! }
//! # Ok::<(), layerguard::LayerguardError>(())
//! ```

use crate::analysis;
use crate::config::{Config, ConfigError};
use crate::discovery::DiscoveryError;
use crate::fs::default_fs;
use crate::parser::ExtractorRegistry;
use crate::remediation::{
    BackupError, Mode, ProposedFix, RemediationEngine, RemediationError, RemediationOutcome,
    TemplateProvider, restore_bundle,
};
use crate::report::Report;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of backup bundles, relative to the project root.
pub const BACKUP_DIR: &str = ".layerguard/backups";

/// Errors that can occur during layerguard operations.
#[derive(Debug, Error)]
pub enum LayerguardError {
    /// The specified path could not be found or resolved.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Remediation aborted: {0}")]
    Remediation(#[from] RemediationError),

    #[error("{0}")]
    Backup(#[from] BackupError),

    /// Some files in a bundle could not be put back.
    #[error("Restore incomplete; failed to restore {} file(s)", .0.len())]
    RestoreIncomplete(Vec<PathBuf>),
}

/// Options for the `check` function.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Use this configuration instead of loading `.layerguard.toml`.
    pub config: Option<Config>,

    /// Replace the configured extensions when non-empty.
    pub extensions: Vec<String>,

    /// Additional directory names to exclude.
    pub exclude: Vec<String>,
}

/// Options for the `remediate` function.
#[derive(Debug, Clone, Default)]
pub struct RemediateOptions {
    pub mode: Mode,

    /// Use this configuration instead of loading `.layerguard.toml`.
    pub config: Option<Config>,

    /// Where the backup bundle goes; defaults to `BACKUP_DIR` under the project.
    pub backup_dir: Option<PathBuf>,

    /// Also propose files for modules missing a required role.
    pub include_missing: bool,

    /// Override `remediation.rollback_factor`.
    pub rollback_factor: Option<f64>,

    /// Check and apply exactly these fixes instead of proposing from
    /// violations.
    pub fixes: Option<Vec<ProposedFix>>,
}

fn resolve(path: &Path) -> Result<PathBuf, LayerguardError> {
    path.canonicalize()
        .map_err(|_| LayerguardError::PathNotFound(path.to_path_buf()))
}

fn load_config(root: &Path, config: Option<Config>) -> Result<Config, LayerguardError> {
    match config {
        Some(c) => Ok(c),
        None => Ok(Config::load(root)?),
    }
}

/// Analyze a project and return its report.
pub fn check(path: &Path, options: CheckOptions) -> Result<Report, LayerguardError> {
    let root = resolve(path)?;
    let mut config = load_config(&root, options.config)?;
    if !options.extensions.is_empty() {
        config.extensions = options.extensions;
    }
    config.exclude.extend(options.exclude);

    let registry = ExtractorRegistry::with_extensions(&config.extensions);
    Ok(analysis::analyze(&root, &config, &registry, default_fs())?)
}

/// Propose, safety-check and (unless dry-run) apply fixes.
///
/// `templates` supplies the text of files created by `CreateFile` fixes.
pub fn remediate(
    path: &Path,
    options: RemediateOptions,
    templates: &TemplateProvider,
) -> Result<RemediationOutcome, LayerguardError> {
    let root = resolve(path)?;
    let mut config = load_config(&root, options.config)?;
    if let Some(factor) = options.rollback_factor {
        if factor < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "rollback factor must be at least 1.0, got {}",
                factor
            ))
            .into());
        }
        config.remediation.rollback_factor = factor;
    }

    let registry = ExtractorRegistry::with_extensions(&config.extensions);
    let fs = default_fs();
    let analysis = analysis::run(&root, &config, &registry, fs)?;

    let backup_dir = options.backup_dir.unwrap_or_else(|| root.join(BACKUP_DIR));
    let engine = RemediationEngine::new(&config, &registry, fs, backup_dir, options.mode);

    let outcome = match options.fixes {
        Some(fixes) => engine.remediate(&analysis, fixes, templates)?,
        None => engine.run(&analysis, options.include_missing, templates)?,
    };
    Ok(outcome)
}

/// Restore every file recorded in a backup bundle. Returns how many files
/// were written back or removed.
pub fn restore(bundle: &Path) -> Result<usize, LayerguardError> {
    let summary = restore_bundle(bundle, default_fs())?;
    if !summary.failures.is_empty() {
        return Err(LayerguardError::RestoreIncomplete(
            summary.failures.into_iter().map(|(path, _)| path).collect(),
        ));
    }
    Ok(summary.restored + summary.removed)
}
