//! Terminal output: status lines, the size table and per-target progress.
//!
//! Colors are decided once by [`init_colors`]; everything else paints
//! through owo-colors' stream-aware helpers so `--no-color`, `NO_COLOR` and
//! non-TTY output all come out plain.

mod format;
mod messages;
mod progress;

pub use format::{print_footer, print_report_table, print_warnings, render_table, warnings_text};
pub use messages::{dimmed, error, info, success, warning};
pub use progress::TaskProgress;

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise colors follow whether
/// stderr is attended.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Apply the color decision globally. Call once, early in `main`.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    owo_colors::set_override(enabled);
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}
