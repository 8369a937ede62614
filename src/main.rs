use clap::Parser;
use layerguard::cli::{Cli, Command};
use layerguard::{cmd_check, cmd_fix, cmd_init, cmd_restore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Command::Check(args) => cmd_check(args),
        Command::Fix(args) => cmd_fix(args),
        Command::Restore(args) => cmd_restore(args),
        Command::Init(args) => cmd_init(args),
    };

    std::process::exit(exit_code);
}

/// Logs go to stderr so reports on stdout stay machine-readable.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "layerguard=warn",
        1 => "layerguard=info",
        _ => "layerguard=debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
