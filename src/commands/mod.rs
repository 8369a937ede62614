mod check;
mod fix;
mod init;
mod restore;

pub use check::cmd_check;
pub use fix::cmd_fix;
pub use init::cmd_init;
pub use restore::cmd_restore;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::fs::FileSystem;
use crate::parser::ExtractorRegistry;
use crate::style;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Exit code for runs that could not complete.
pub const EXIT_FATAL: i32 = 2;

/// Shared context for command execution, reducing boilerplate across commands.
pub struct CommandContext {
    pub path: PathBuf,
    pub config: Config,
    pub registry: ExtractorRegistry,
}

impl CommandContext {
    /// Resolve the path, load config and set up extractors.
    /// Returns Err(exit_code) if setup fails.
    pub fn new(path: &Path, extensions: Option<&[String]>) -> Result<Self, i32> {
        let resolved_path = match path.canonicalize() {
            Ok(p) => p,
            Err(_) => {
                style::error(&format!("Could not resolve path: {}", style::path(path)));
                return Err(EXIT_FATAL);
            }
        };

        let mut config = match Config::load(&resolved_path) {
            Ok(config) => config,
            Err(e) => {
                style::error(&format!("Failed to load config: {}", e));
                return Err(EXIT_FATAL);
            }
        };
        if let Some(extensions) = extensions {
            config.extensions = extensions.to_vec();
        }

        let registry = ExtractorRegistry::with_extensions(&config.extensions);

        Ok(Self {
            path: resolved_path,
            config,
            registry,
        })
    }
}

/// Write formatted output to `output` or stdout, rendering markdown on a TTY.
pub fn emit(
    buffer: &[u8],
    format: OutputFormat,
    output: Option<&Path>,
    fs: &dyn FileSystem,
) -> Result<(), i32> {
    let output_str = String::from_utf8_lossy(buffer);

    let write_result = match output {
        Some(path) => fs.write(path, &output_str),
        None if format == OutputFormat::Markdown => {
            style::render_markdown(&output_str, &mut io::stdout())
        }
        None => write!(io::stdout(), "{}", output_str),
    };

    write_result.map_err(|e| {
        style::error(&format!("Failed to write output: {}", e));
        EXIT_FATAL
    })
}
