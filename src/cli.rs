use crate::model::Severity;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "layerguard")]
#[command(about = "Enforce layering and module isolation across a source tree")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze the tree and report violations
    Check(CheckArgs),

    /// Propose, safety-check and optionally apply fixes
    Fix(FixArgs),

    /// Restore files from a backup bundle
    Restore(RestoreArgs),

    /// Generate a starter .layerguard.toml configuration file
    Init(InitArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Project root (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "markdown")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Minimum severity to report
    #[arg(long, default_value = "low")]
    pub min_severity: Severity,

    /// Extensions to scan (comma-separated), replacing the configured list
    #[arg(long, value_delimiter = ',')]
    pub ext: Option<Vec<String>>,

    /// Additional directory names to exclude (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct FixArgs {
    /// Project root (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Write accepted fixes (default is a dry run)
    #[arg(long, conflicts_with = "force")]
    pub apply: bool,

    /// Write accepted fixes and allow created files to overwrite existing ones
    #[arg(long)]
    pub force: bool,

    /// Also create files for modules missing a required role
    #[arg(long)]
    pub missing: bool,

    /// Directory for the backup bundle (defaults to .layerguard/backups)
    #[arg(long)]
    pub backup_dir: Option<PathBuf>,

    /// Roll back when High violations exceed this multiple of the pre-fix count
    #[arg(long)]
    pub rollback_factor: Option<f64>,

    /// Output format
    #[arg(short, long, default_value = "markdown")]
    pub format: OutputFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct RestoreArgs {
    /// Backup bundle written by `fix --apply`
    pub bundle: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Directory to create the config file in (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fix_flags() {
        let cli = Cli::parse_from(["layerguard", "-vv", "fix", "web", "--apply", "--missing"]);
        assert_eq!(cli.verbose, 2);
        let Command::Fix(args) = cli.command else {
            panic!("expected fix");
        };
        assert!(args.apply);
        assert!(args.missing);
        assert_eq!(args.path, PathBuf::from("web"));
    }

    #[test]
    fn test_apply_conflicts_with_force() {
        assert!(Cli::try_parse_from(["layerguard", "fix", "--apply", "--force"]).is_err());
    }

    #[test]
    fn test_check_severity_aliases() {
        let cli = Cli::parse_from(["layerguard", "check", "--min-severity", "warning"]);
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.min_severity, Severity::Medium);
    }
}
