//! Guarded remediation: propose fixes, prove each one safe against the rule
//! engine, then apply the accepted batch behind a backup bundle with
//! rollback on regression.

mod backup;
mod fix;
mod propose;
mod safety;

pub use backup::{BackupBundle, BackupEntry, BackupError, RestoreSummary};
pub use fix::{FixState, ProposedFix};
pub use propose::{Proposals, SkippedViolation, missing_artifacts};
pub use safety::{SafetyCheck, insert_after_last_import};

use crate::analysis::{Analysis, analyze_files};
use crate::config::Config;
use crate::fs::FileSystem;
use crate::model::FileRole;
use crate::parser::ExtractorRegistry;
use crate::report::Verdict;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Produces the text of a created file from its role and context (the
/// module name for missing-artifact fixes).
pub type TemplateProvider<'a> = dyn Fn(FileRole, &str) -> String + 'a;

#[derive(Debug, Error)]
pub enum RemediationError {
    #[error(transparent)]
    Backup(#[from] BackupError),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Report decisions only.
    #[default]
    DryRun,
    Apply,
    /// Apply, and let `CreateFile` overwrite existing files.
    Force,
}

impl Mode {
    pub fn writes(self) -> bool {
        !matches!(self, Mode::DryRun)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::DryRun => write!(f, "dry-run"),
            Mode::Apply => write!(f, "apply"),
            Mode::Force => write!(f, "force"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixRecord {
    pub fix: ProposedFix,
    pub state: FixState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub message: String,
}

/// The batch made things worse and was undone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollbackRecord {
    pub pre_high: usize,
    pub post_high: usize,
    pub factor: f64,
    pub restore: RestoreSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemediationOutcome {
    pub mode: Mode,
    pub fixes: Vec<FixRecord>,
    pub skipped: Vec<SkippedViolation>,
    pub write_failures: Vec<WriteFailure>,
    pub backup: Option<PathBuf>,
    pub pre_high: usize,
    pub post_high: Option<usize>,
    pub post_verdict: Option<Verdict>,
    pub rollback: Option<RollbackRecord>,
}

impl RemediationOutcome {
    pub fn count(&self, pred: impl Fn(&FixState) -> bool) -> usize {
        self.fixes.iter().filter(|r| pred(&r.state)).count()
    }

    pub fn applied(&self) -> usize {
        self.count(|s| *s == FixState::Applied)
    }

    pub fn rejected(&self) -> usize {
        self.count(FixState::is_rejected)
    }

    pub fn rolled_back(&self) -> bool {
        self.rollback.is_some()
    }
}

/// Text written by default for created files.
pub fn default_template(role: FileRole, context: &str) -> String {
    match role {
        FileRole::Index => format!("// Public surface of the `{}` module.\nexport {{}};\n", context),
        _ => format!("// {} for `{}`.\nexport {{}};\n", role, context),
    }
}

pub struct RemediationEngine<'a> {
    config: &'a Config,
    registry: &'a ExtractorRegistry,
    fs: &'a dyn FileSystem,
    backup_dir: PathBuf,
    mode: Mode,
}

impl<'a> RemediationEngine<'a> {
    pub fn new(
        config: &'a Config,
        registry: &'a ExtractorRegistry,
        fs: &'a dyn FileSystem,
        backup_dir: PathBuf,
        mode: Mode,
    ) -> Self {
        Self {
            config,
            registry,
            fs,
            backup_dir,
            mode,
        }
    }

    /// Proposals for the analysis' violations, plus missing-artifact
    /// `CreateFile`s when `include_missing` is set.
    pub fn propose(&self, analysis: &Analysis, include_missing: bool) -> Proposals {
        let check = SafetyCheck::new(analysis, self.config, self.registry, Vec::new());
        let mut proposals = propose::from_violations(
            &analysis.report.violations,
            analysis,
            check.engine(),
            self.registry,
            self.fs,
        );
        if include_missing {
            proposals.fixes.extend(missing_artifacts(analysis, self.config));
        }
        debug!(
            fixes = proposals.fixes.len(),
            skipped = proposals.skipped.len(),
            "proposals ready"
        );
        proposals
    }

    /// Propose and remediate in one step.
    pub fn run(
        &self,
        analysis: &Analysis,
        include_missing: bool,
        templates: &TemplateProvider,
    ) -> Result<RemediationOutcome, RemediationError> {
        let proposals = self.propose(analysis, include_missing);
        let mut outcome = self.remediate(analysis, proposals.fixes, templates)?;
        outcome.skipped = proposals.skipped;
        Ok(outcome)
    }

    /// Safety-check `fixes` against `analysis` and, unless in dry-run,
    /// apply the accepted ones.
    pub fn remediate(
        &self,
        analysis: &Analysis,
        fixes: Vec<ProposedFix>,
        templates: &TemplateProvider,
    ) -> Result<RemediationOutcome, RemediationError> {
        let created: Vec<PathBuf> = fixes
            .iter()
            .filter_map(|f| match f {
                ProposedFix::CreateFile { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect();
        let check = SafetyCheck::new(analysis, self.config, self.registry, created);

        let mut records: Vec<FixRecord> = fixes
            .into_iter()
            .map(|fix| FixRecord {
                fix,
                state: FixState::Proposed,
            })
            .collect();

        let mut touched = HashSet::new();
        let mut planned: Vec<(usize, String)> = Vec::new();
        for (idx, record) in records.iter_mut().enumerate() {
            let path = record.fix.path().to_path_buf();
            let decision = if !touched.insert(path.clone()) {
                Err("another fix in this batch already touches this file".to_string())
            } else {
                self.materialize(&record.fix, templates)
                    .and_then(|text| check.check(&path, &text).map(|_| text))
            };
            match decision {
                Ok(text) => {
                    debug!(path = %path.display(), "fix passed safety check");
                    record.state = FixState::SafetyChecked;
                    planned.push((idx, text));
                }
                Err(reason) => {
                    info!(path = %path.display(), %reason, "fix rejected");
                    record.state = FixState::Rejected { reason };
                }
            }
        }

        let pre_high = analysis.report.high_count();
        let mut outcome = RemediationOutcome {
            mode: self.mode,
            fixes: records,
            skipped: Vec::new(),
            write_failures: Vec::new(),
            backup: None,
            pre_high,
            post_high: None,
            post_verdict: None,
            rollback: None,
        };

        if !self.mode.writes() || planned.is_empty() {
            return Ok(outcome);
        }

        let bundle = BackupBundle::capture(
            planned.iter().map(|(idx, _)| outcome.fixes[*idx].fix.path()),
            self.fs,
        )?;
        outcome.backup = Some(bundle.save(&self.backup_dir, self.fs)?);

        for (idx, text) in &planned {
            let record = &mut outcome.fixes[*idx];
            let path = record.fix.path().to_path_buf();
            match self.fs.write(&path, text) {
                Ok(()) => {
                    info!(path = %path.display(), "fix applied");
                    record.state = FixState::Applied;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "write failed");
                    outcome.write_failures.push(WriteFailure {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        let after = self.reanalyze(analysis, &outcome);
        let post_high = after.report.high_count();
        outcome.post_high = Some(post_high);
        outcome.post_verdict = Some(after.report.verdict);

        let factor = self.config.remediation.rollback_factor;
        if regressed(pre_high, post_high, factor) {
            warn!(pre_high, post_high, factor, "high-severity count regressed, rolling back");
            let restore = bundle.restore(self.fs);
            for record in &mut outcome.fixes {
                if record.state == FixState::Applied {
                    record.state = FixState::RolledBack;
                }
            }
            outcome.rollback = Some(RollbackRecord {
                pre_high,
                post_high,
                factor,
                restore,
            });
        }

        Ok(outcome)
    }

    /// Post-fix text of a fix, or the reason it cannot have one.
    fn materialize(&self, fix: &ProposedFix, templates: &TemplateProvider) -> Result<String, String> {
        match fix {
            ProposedFix::Replace { text, .. } => Ok(text.clone()),
            ProposedFix::InsertReference {
                path,
                target,
                mode,
                binding,
            } => {
                let extractor = self
                    .registry
                    .find_extractor(path)
                    .ok_or_else(|| format!("no extractor for {}", path.display()))?;
                let text = self
                    .fs
                    .read_to_string(path)
                    .map_err(|e| format!("cannot read file: {}", e))?;
                let statement = extractor.render_reference(target, *mode, binding);
                Ok(insert_after_last_import(&text, self.registry, path, &statement))
            }
            ProposedFix::CreateFile {
                path,
                role,
                context,
            } => {
                if self.fs.exists(path) && self.mode != Mode::Force {
                    return Err("file already exists".to_string());
                }
                Ok(templates(*role, context))
            }
        }
    }

    /// Full analysis of the pre-fix file set plus files the batch created.
    fn reanalyze(&self, analysis: &Analysis, outcome: &RemediationOutcome) -> Analysis {
        let mut files: Vec<PathBuf> = analysis
            .graph
            .files()
            .iter()
            .map(|f| f.path.clone())
            .collect();
        for record in &outcome.fixes {
            if let (ProposedFix::CreateFile { path, .. }, FixState::Applied) = (&record.fix, &record.state) {
                files.push(path.clone());
            }
        }
        files.sort();
        files.dedup();
        analyze_files(
            analysis.classifier.project_root(),
            files,
            Vec::new(),
            self.config,
            self.registry,
            self.fs,
        )
    }
}

fn regressed(pre_high: usize, post_high: usize, factor: f64) -> bool {
    post_high as f64 > pre_high as f64 * factor
}

/// Restore every file recorded in the bundle at `bundle_path`.
pub fn restore_bundle(bundle_path: &Path, fs: &dyn FileSystem) -> Result<RestoreSummary, BackupError> {
    let bundle = BackupBundle::load(bundle_path, fs)?;
    info!(path = %bundle_path.display(), files = bundle.entries.len(), "restoring backup bundle");
    Ok(bundle.restore(fs))
}
