//! Miette diagnostic conversion for CLI errors.

use miette::Report;

use crate::error::{BuildError, CliError};

/// Convert a [`CliError`] into a miette report for the top-level handler.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        // sether_build::Error carries its own code and help.
        CliError::Plan(e) => Report::new(e),
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!(
            help = "Check sether.config.json, SETHER_* variables and package.json",
            "Configuration error: {}",
            e
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert a [`BuildError`] into a miette report.
pub fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::Failed { output_id, message, failed, total } => miette::miette!(
            code = "BUILD_FAILED",
            help = "Run with --verbose to see bundler output",
            "Build failed ({} of {} targets)\n\n{}: {}",
            failed,
            total,
            output_id,
            message
        ),
        other => miette::miette!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_build_report_names_target() {
        let report = build_error_to_miette(BuildError::Failed {
            output_id: "widgets.cjs.js".to_string(),
            message: "boom".to_string(),
            failed: 2,
            total: 3,
        });
        let text = report.to_string();
        assert!(text.contains("2 of 3 targets"));
        assert!(text.contains("widgets.cjs.js: boom"));
    }

    #[test]
    fn test_plan_error_keeps_message() {
        let report = cli_error_to_miette(CliError::Plan(sether_build::Error::MissingOutput {
            name: "legacy".to_string(),
        }));
        assert!(report.to_string().contains("legacy"));
    }
}
