//! `sether build`.

use std::sync::Arc;
use std::time::Instant;

use sether_build::backend::{
    BackendOptions, CallbackAdapter, ProcessCallbackBundler, ProcessStreamingBundler,
    StreamingAdapter,
};
use sether_build::{aggregate, build_tasks, format_duration, BuildReport, BuildTask, Scheduler};
use sether_config::{resolve_targets, BackendKind, LoadOptions, ResolvedConfig};

use crate::cli::BuildArgs;
use crate::commands::{utils, CommandContext};
use crate::error::{BuildError, Result};
use crate::ui;

/// Execute the build command.
///
/// 1. Load configuration and derive targets
/// 2. Plan tasks (output collisions abort here, before anything is touched)
/// 3. Clean the output directory
/// 4. Run every task concurrently
/// 5. Print warnings, the size table and the outcome
pub async fn execute(args: BuildArgs, ctx: &CommandContext) -> Result<()> {
    let started = Instant::now();

    let config = ResolvedConfig::discover(&ctx.cwd, &LoadOptions { name: args.name })?;
    let tasks = build_tasks(resolve_targets(&config)?)?;
    tracing::debug!(name = %config.name, tasks = tasks.len(), "planned build");

    if !ctx.quiet {
        ui::info("Cleaning dist folder...");
    }
    utils::clean_output_dir(&config.paths.app_build, &config.paths.app_path)?;

    if tasks.is_empty() {
        ui::warning("No targets enabled; nothing to build.");
        return Ok(());
    }

    if !ctx.quiet {
        ui::info("Collating builds...");
    }
    let report = run(&config, tasks, ctx.quiet).await;

    if !ctx.quiet {
        ui::print_warnings(&report.warnings);
    }

    if report.success {
        if !ctx.quiet {
            ui::print_report_table(&report.rows());
            ui::print_footer();
            ui::success(&format!(
                "Build complete in {}",
                format_duration(started.elapsed())
            ));
        }
        return Ok(());
    }

    Err(report_failure(&report).into())
}

/// Run `tasks` with the process-backed bundlers and aggregate the outcome.
async fn run(config: &ResolvedConfig, tasks: Vec<BuildTask>, quiet: bool) -> BuildReport {
    let options = BackendOptions::from_config(config);
    let bundlers = &config.settings.bundlers;

    let progress = Arc::new(ui::TaskProgress::new(
        &tasks,
        ui::TaskProgress::should_show(quiet),
    ));
    let scheduler = Scheduler::new()
        .with_adapter(
            BackendKind::StreamingBundler,
            Arc::new(StreamingAdapter::new(ProcessStreamingBundler::new(
                bundlers.streaming.clone(),
                options.clone(),
            ))),
        )
        .with_adapter(
            BackendKind::CallbackBundler,
            Arc::new(CallbackAdapter::new(ProcessCallbackBundler::new(
                bundlers.callback.clone(),
                options,
            ))),
        )
        .with_observer(progress.clone());

    let results = scheduler.run(tasks).await;
    progress.clear();
    aggregate(results)
}

/// Print the failure and turn it into the command's error.
fn report_failure(report: &BuildReport) -> BuildError {
    let failed: Vec<_> = report.failed().collect();

    ui::error("Failed to compile.");
    if let Some(error) = &report.error {
        eprintln!();
        eprintln!("{error}");
        if let Some(details) = &error.details {
            ui::dimmed(details);
        }
        eprintln!();
    }
    for result in failed.iter().skip(1) {
        let message = result.error.as_ref().map(|e| e.message.as_str()).unwrap_or("failed");
        ui::dimmed(&format!("{}: {}", result.output_id, message));
    }

    let first = failed.first();
    BuildError::Failed {
        output_id: first.map(|r| r.output_id.clone()).unwrap_or_default(),
        message: report
            .error
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "unknown error".to_string()),
        failed: failed.len(),
        total: report.results.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sether_build::{BuildResult, ErrorInfo, FailureKind};
    use std::time::Duration;

    #[test]
    fn test_report_failure_uses_first_failing_task() {
        let report = aggregate(vec![
            BuildResult::succeeded("a.js", Duration::from_millis(5), Vec::new(), Vec::new()),
            BuildResult::failed("b.js", Duration::ZERO, ErrorInfo::new(FailureKind::Build, "first")),
            BuildResult::failed("c.js", Duration::ZERO, ErrorInfo::new(FailureKind::Transport, "second")),
        ]);

        match report_failure(&report) {
            BuildError::Failed { output_id, message, failed, total } => {
                assert_eq!(output_id, "b.js");
                assert_eq!(message, "first");
                assert_eq!((failed, total), (2, 3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
