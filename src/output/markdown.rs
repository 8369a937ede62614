use crate::model::{RuleKind, Severity, Violation};
use crate::output::{OutputFormatter, relative_path};
use crate::remediation::{FixState, RemediationOutcome};
use crate::report::Report;
use std::io::Write;
use std::path::PathBuf;

pub struct MarkdownOutput {
    pub min_severity: Severity,
    pub project_root: Option<PathBuf>,
}

impl MarkdownOutput {
    pub fn new(min_severity: Severity, project_root: Option<PathBuf>) -> Self {
        Self {
            min_severity,
            project_root,
        }
    }

    fn location(&self, violation: &Violation) -> String {
        let path = relative_path(&violation.file, self.project_root.as_ref());
        match violation.line {
            Some(line) => format!("{}:{}", path, line),
            None => path,
        }
    }
}

fn heading(rule: RuleKind) -> &'static str {
    match rule {
        RuleKind::Hierarchy => "Layer Hierarchy",
        RuleKind::Isolation => "Module Isolation",
        RuleKind::Responsibility => "Responsibility",
        RuleKind::Cycle => "Module Cycles",
        RuleKind::Structural => "Structure",
    }
}

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "🔴",
        Severity::Medium => "🟡",
        Severity::Low => "⚪",
    }
}

impl OutputFormatter for MarkdownOutput {
    fn format_report<W: Write>(&self, report: &Report, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "# Layer Check: {}\n", report.project_name)?;
        writeln!(writer, "**Verdict: {}**\n", report.verdict)?;
        writeln!(
            writer,
            "{} files, {} references ({} unresolved), {} modules\n",
            report.stats.files, report.stats.edges, report.stats.unresolved_edges, report.stats.modules
        )?;

        let filtered: Vec<_> = report
            .violations
            .iter()
            .filter(|v| v.severity >= self.min_severity)
            .collect();

        if filtered.is_empty() {
            writeln!(writer, "## No Violations Found\n")?;
            if report.violations.is_empty() {
                writeln!(writer, "All layering and isolation rules hold.")?;
            } else {
                writeln!(
                    writer,
                    "{} violations below `{}` severity hidden.",
                    report.violations.len(),
                    self.min_severity
                )?;
            }
        } else {
            writeln!(writer, "## Violations\n")?;
            for rule in RuleKind::ALL {
                let group: Vec<_> = filtered.iter().filter(|v| v.rule == rule).collect();
                if group.is_empty() {
                    continue;
                }
                writeln!(writer, "### {} ({})\n", heading(rule), group.len())?;
                for v in group {
                    if rule == RuleKind::Cycle {
                        writeln!(writer, "- {} {}", marker(v.severity), v.message)?;
                    } else {
                        writeln!(
                            writer,
                            "- {} `{}` - {}",
                            marker(v.severity),
                            self.location(v),
                            v.message
                        )?;
                    }
                }
                writeln!(writer)?;
            }
        }

        if !report.errors.is_empty() {
            writeln!(writer, "## Skipped Files\n")?;
            for e in &report.errors {
                match &e.path {
                    Some(path) => writeln!(
                        writer,
                        "- `{}` - {}",
                        relative_path(path, self.project_root.as_ref()),
                        e.message
                    )?,
                    None => writeln!(writer, "- {}", e.message)?,
                }
            }
            writeln!(writer)?;
        }

        writeln!(writer, "## Summary\n")?;
        writeln!(writer, "| Severity | Count |")?;
        writeln!(writer, "|----------|-------|")?;
        for severity in [Severity::High, Severity::Medium, Severity::Low] {
            let count = report.summary.by_severity.get(&severity).copied().unwrap_or(0);
            writeln!(writer, "| {} | {} |", severity, count)?;
        }

        Ok(())
    }

    fn format_outcome<W: Write>(
        &self,
        outcome: &RemediationOutcome,
        writer: &mut W,
    ) -> std::io::Result<()> {
        writeln!(writer, "# Remediation ({})\n", outcome.mode)?;

        if outcome.fixes.is_empty() {
            writeln!(writer, "No fixes proposed.\n")?;
        } else {
            writeln!(writer, "## Fixes\n")?;
            for record in &outcome.fixes {
                let path = relative_path(record.fix.path(), self.project_root.as_ref());
                let state = match &record.state {
                    FixState::Applied => "✅ applied".to_string(),
                    FixState::SafetyChecked => "☑️ safe".to_string(),
                    FixState::Proposed => "proposed".to_string(),
                    FixState::Rejected { reason } => format!("❌ rejected: {}", reason),
                    FixState::RolledBack => "↩️ rolled back".to_string(),
                };
                writeln!(writer, "- `{}` - {} ({})", path, record.fix.describe(), state)?;
            }
            writeln!(writer)?;
        }

        if !outcome.skipped.is_empty() {
            writeln!(writer, "## Not Fixable Automatically\n")?;
            for s in &outcome.skipped {
                let path = relative_path(&s.file, self.project_root.as_ref());
                let line = s.line.map(|l| format!(":{}", l)).unwrap_or_default();
                writeln!(writer, "- `{}{}` - {} ({})", path, line, s.message, s.reason)?;
            }
            writeln!(writer)?;
        }

        if !outcome.write_failures.is_empty() {
            writeln!(writer, "## Write Failures\n")?;
            for f in &outcome.write_failures {
                writeln!(
                    writer,
                    "- `{}` - {}",
                    relative_path(&f.path, self.project_root.as_ref()),
                    f.message
                )?;
            }
            writeln!(writer)?;
        }

        if let Some(backup) = &outcome.backup {
            writeln!(writer, "Backup: `{}`\n", backup.display())?;
        }

        match (&outcome.rollback, outcome.post_high) {
            (Some(rollback), _) => writeln!(
                writer,
                "**Rolled back:** high-severity violations went from {} to {} (limit {}x); {} files restored, {} removed.",
                rollback.pre_high,
                rollback.post_high,
                rollback.factor,
                rollback.restore.restored,
                rollback.restore.removed
            )?,
            (None, Some(post)) => writeln!(
                writer,
                "High-severity violations: {} → {}",
                outcome.pre_high, post
            )?,
            (None, None) => writeln!(
                writer,
                "High-severity violations: {}",
                outcome.pre_high
            )?,
        }

        Ok(())
    }
}
