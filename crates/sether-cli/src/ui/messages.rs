//! Status lines written to stderr.

use owo_colors::{OwoColorize, Stream, Style};

fn paint(text: &str, style: Style) -> String {
    text.if_supports_color(Stream::Stderr, |t| t.style(style)).to_string()
}

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", paint("✔", Style::new().green().bold()), message);
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!("{} {}", paint("ℹ", Style::new().blue().bold()), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        paint("⚠", Style::new().yellow().bold()),
        paint(message, Style::new().yellow())
    );
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", paint("✗", Style::new().red().bold()), paint(message, Style::new().red()));
}

/// Print secondary detail (bundler output, stack traces) to stderr.
pub fn dimmed(message: &str) {
    for line in message.lines() {
        eprintln!("  {}", paint(line, Style::new().dimmed()));
    }
}
