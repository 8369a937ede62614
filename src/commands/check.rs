use crate::cli::{CheckArgs, OutputFormat};
use crate::fs::{FileSystem, default_fs};
use crate::output::{JsonOutput, MarkdownOutput, OutputFormatter};
use crate::report::Verdict;
use crate::style;

use super::{CommandContext, EXIT_FATAL, emit};

pub fn cmd_check(args: CheckArgs) -> i32 {
    cmd_check_with_fs(args, default_fs())
}

pub fn cmd_check_with_fs(args: CheckArgs, fs: &dyn FileSystem) -> i32 {
    let mut ctx = match CommandContext::new(&args.path, args.ext.as_deref()) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    ctx.config.exclude.extend(args.exclude.iter().cloned());

    let report = match crate::analysis::analyze(&ctx.path, &ctx.config, &ctx.registry, fs) {
        Ok(report) => report,
        Err(e) => {
            style::error(&e.to_string());
            return EXIT_FATAL;
        }
    };

    let mut buffer = Vec::new();
    let format_result = match args.format {
        OutputFormat::Markdown => {
            MarkdownOutput::new(args.min_severity, Some(ctx.path.clone()))
                .format_report(&report, &mut buffer)
        }
        OutputFormat::Json => JsonOutput::new().format_report(&report, &mut buffer),
    };
    if let Err(e) = format_result {
        style::error(&format!("Failed to format output: {}", e));
        return EXIT_FATAL;
    }

    if let Err(code) = emit(&buffer, args.format, args.output.as_deref(), fs) {
        return code;
    }

    if !report.errors.is_empty() {
        style::warning(&format!("{} files could not be analyzed", report.errors.len()));
    }

    // PASS and WARN succeed; only High violations should block CI
    match report.verdict {
        Verdict::Fail => 1,
        Verdict::Pass | Verdict::Warn => 0,
    }
}
