pub mod analysis;
pub mod api;
pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod fs;
pub mod model;
pub mod output;
pub mod parser;
pub mod remediation;
pub mod report;
pub mod style;

pub use api::{CheckOptions, LayerguardError, RemediateOptions, check, remediate, restore};
pub use cli::Cli;
pub use commands::{cmd_check, cmd_fix, cmd_init, cmd_restore};
pub use config::Config;
pub use remediation::{FixState, Mode, ProposedFix, RemediationOutcome, TemplateProvider};
pub use report::{Report, Verdict};
