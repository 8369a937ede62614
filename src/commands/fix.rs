use crate::api::BACKUP_DIR;
use crate::cli::{FixArgs, OutputFormat};
use crate::fs::{FileSystem, default_fs};
use crate::model::Severity;
use crate::output::{JsonOutput, MarkdownOutput, OutputFormatter};
use crate::remediation::{FixState, Mode, RemediationEngine, default_template};
use crate::style;

use super::{CommandContext, EXIT_FATAL, emit};

pub fn cmd_fix(args: FixArgs) -> i32 {
    cmd_fix_with_fs(args, default_fs())
}

pub fn cmd_fix_with_fs(args: FixArgs, fs: &dyn FileSystem) -> i32 {
    let mut ctx = match CommandContext::new(&args.path, None) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    if let Some(factor) = args.rollback_factor {
        if factor < 1.0 {
            style::error(&format!("--rollback-factor must be at least 1.0, got {}", factor));
            return EXIT_FATAL;
        }
        ctx.config.remediation.rollback_factor = factor;
    }

    let mode = if args.force {
        Mode::Force
    } else if args.apply {
        Mode::Apply
    } else {
        Mode::DryRun
    };

    let analysis = match crate::analysis::run(&ctx.path, &ctx.config, &ctx.registry, fs) {
        Ok(analysis) => analysis,
        Err(e) => {
            style::error(&e.to_string());
            return EXIT_FATAL;
        }
    };

    let backup_dir = args
        .backup_dir
        .clone()
        .unwrap_or_else(|| ctx.path.join(BACKUP_DIR));
    let engine = RemediationEngine::new(&ctx.config, &ctx.registry, fs, backup_dir, mode);
    let outcome = match engine.run(&analysis, args.missing, &default_template) {
        Ok(outcome) => outcome,
        Err(e) => {
            style::error(&e.to_string());
            style::hint("No files were changed.");
            return EXIT_FATAL;
        }
    };

    let mut buffer = Vec::new();
    let format_result = match args.format {
        OutputFormat::Markdown => MarkdownOutput::new(Severity::Low, Some(ctx.path.clone()))
            .format_outcome(&outcome, &mut buffer),
        OutputFormat::Json => JsonOutput::new().format_outcome(&outcome, &mut buffer),
    };
    if let Err(e) = format_result {
        style::error(&format!("Failed to format output: {}", e));
        return EXIT_FATAL;
    }
    if let Err(code) = emit(&buffer, args.format, None, fs) {
        return code;
    }

    if mode == Mode::DryRun && outcome.count(|s| *s == FixState::SafetyChecked) > 0 {
        style::hint("Re-run with --apply to write the accepted fixes.");
    }
    if let Some(bundle) = &outcome.backup {
        style::hint(&format!("Undo with: layerguard restore {}", bundle.display()));
    }

    if outcome.rolled_back() || !outcome.write_failures.is_empty() {
        1
    } else {
        0
    }
}
