use crate::cli::RestoreArgs;
use crate::fs::{FileSystem, default_fs};
use crate::remediation::restore_bundle;
use crate::style;

use super::EXIT_FATAL;

pub fn cmd_restore(args: RestoreArgs) -> i32 {
    cmd_restore_with_fs(args, default_fs())
}

pub fn cmd_restore_with_fs(args: RestoreArgs, fs: &dyn FileSystem) -> i32 {
    let summary = match restore_bundle(&args.bundle, fs) {
        Ok(summary) => summary,
        Err(e) => {
            style::error(&e.to_string());
            return EXIT_FATAL;
        }
    };

    for (path, message) in &summary.failures {
        style::warning(&format!("{}: {}", style::path(path), message));
    }
    style::success(&format!(
        "Restored {} files, removed {} created files",
        summary.restored, summary.removed
    ));

    if summary.failures.is_empty() { 0 } else { 1 }
}
