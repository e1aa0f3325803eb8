//! `sether check`: plan the build without running any bundler.

use sether_build::{build_tasks, BuildTask};
use sether_config::{resolve_targets, LoadOptions, ResolvedConfig};

use crate::cli::CheckArgs;
use crate::commands::CommandContext;
use crate::error::Result;
use crate::ui;

/// Execute the check command.
///
/// Prints one line per planned task on stdout, and each task's resolved
/// configuration when `--print-config` is given.
pub async fn execute(args: CheckArgs, ctx: &CommandContext) -> Result<()> {
    let config = ResolvedConfig::discover(&ctx.cwd, &LoadOptions { name: args.name })?;
    let tasks = build_tasks(resolve_targets(&config)?)?;

    if !ctx.quiet {
        ui::info(&format!(
            "{} ({} target{}, output in {})",
            config.name,
            tasks.len(),
            if tasks.len() == 1 { "" } else { "s" },
            config.paths.app_build_dir
        ));
    }

    for line in plan_lines(&tasks) {
        println!("{line}");
    }

    if args.print_config {
        for task in &tasks {
            println!();
            println!("# {}", task.name());
            println!("{}", serde_json::to_string_pretty(task.config.tree())?);
        }
    }

    if !ctx.quiet {
        ui::success("Configuration is valid");
    }
    Ok(())
}

/// `name -> output_id (backend)` for every task, in build order.
fn plan_lines(tasks: &[BuildTask]) -> Vec<String> {
    tasks
        .iter()
        .map(|task| format!("{} -> {} ({})", task.name(), task.output_id, task.backend))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sether_config::{BackendKind, ConfigTree, NamedConfig};
    use serde_json::json;

    fn named(name: &str, backend: BackendKind, filename: &str) -> NamedConfig {
        let tree: ConfigTree = json!({ "output": { "filename": filename } })
            .as_object()
            .cloned()
            .unwrap_or_default();
        NamedConfig::new(name, backend, tree)
    }

    #[test]
    fn test_plan_lines() {
        let tasks = build_tasks(vec![
            named("esm", BackendKind::StreamingBundler, "dist/widgets.esm.js"),
            named("cjs", BackendKind::CallbackBundler, "widgets.cjs.js"),
        ])
        .unwrap();

        assert_eq!(
            plan_lines(&tasks),
            vec![
                "esm -> widgets.esm.js (streaming)".to_string(),
                "cjs -> widgets.cjs.js (callback)".to_string(),
            ]
        );
    }
}
