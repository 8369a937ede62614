mod json;
mod markdown;

pub use json::JsonOutput;
pub use markdown::MarkdownOutput;

use crate::remediation::RemediationOutcome;
use crate::report::Report;
use std::io::Write;
use std::path::{Path, PathBuf};

pub trait OutputFormatter {
    fn format_report<W: Write>(&self, report: &Report, writer: &mut W) -> std::io::Result<()>;

    fn format_outcome<W: Write>(
        &self,
        outcome: &RemediationOutcome,
        writer: &mut W,
    ) -> std::io::Result<()>;
}

/// Convert an absolute path to a relative path based on project root.
/// Returns the path as-is if no root is provided or if strip_prefix fails.
pub fn relative_path(path: &Path, project_root: Option<&PathBuf>) -> String {
    if let Some(root) = project_root {
        path.strip_prefix(root)
            .unwrap_or(path)
            .display()
            .to_string()
    } else {
        path.display().to_string()
    }
}
