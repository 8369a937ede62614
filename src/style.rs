//! Terminal styling utilities for consistent CLI output

use colored::Colorize;
use crossterm::style::Color;
use std::io::{self, IsTerminal, Write};

/// Print an error message to stderr
pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

/// Print a warning message to stderr
pub fn warning(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

/// Print a success message to stderr, keeping stdout for reports
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green().bold(), msg);
}

/// Print a hint message to stderr (dimmed)
pub fn hint(msg: &str) {
    eprintln!("{} {}", "hint:".dimmed(), msg.dimmed());
}

/// Format a path for display (bright white)
pub fn path(p: &std::path::Path) -> String {
    p.display().to_string().bright_white().to_string()
}

/// Render markdown to the terminal with colors and formatting.
/// If not a TTY, writes plain markdown.
pub fn render_markdown(markdown: &str, output: &mut dyn Write) -> io::Result<()> {
    if io::stdout().is_terminal() {
        let skin = create_skin();
        let rendered = skin.term_text(markdown);
        write!(output, "{}", rendered)
    } else {
        write!(output, "{}", markdown)
    }
}

/// Verdict and severity headers stand out; paths in inline code are yellow.
fn create_skin() -> termimad::MadSkin {
    use termimad::*;

    let mut skin = MadSkin::default();
    skin.set_headers_fg(Color::Cyan);
    skin.bold.set_fg(Color::White);
    skin.bullet = StyledChar::from_fg_char(Color::Blue, '•');
    skin.inline_code.set_fg(Color::Yellow);
    skin.horizontal_rule = StyledChar::from_fg_char(Color::DarkGrey, '─');
    skin
}
