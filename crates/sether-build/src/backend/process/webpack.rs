use std::process::{Command, Stdio};

use sether_config::ConfigTree;

use super::{create_module_file, render_module, split_command, tail, ModuleFormat};
use crate::backend::{BackendError, BackendOptions, CallbackBundler, CompilationStats, Completion};
use crate::task::output_id;

/// Runs the callback bundler's CLI (`<command> --config <module> --json`) on
/// a worker thread and reports the parsed stats through the callback.
#[derive(Debug, Clone)]
pub struct ProcessCallbackBundler {
    command: Vec<String>,
    options: BackendOptions,
}

impl ProcessCallbackBundler {
    pub fn new(command: Vec<String>, options: BackendOptions) -> Self {
        Self { command, options }
    }
}

impl CallbackBundler for ProcessCallbackBundler {
    fn run(&self, config: ConfigTree, done: Completion) {
        let label = output_id(&config).unwrap_or_else(|| "bundle".to_string());
        let job = Job {
            command: self.command.clone(),
            options: self.options.clone(),
            label,
        };

        let spawned = std::thread::Builder::new()
            .name(format!("sether-callback-{}", job.label))
            .spawn(move || {
                match job.execute(&config) {
                    Ok(stats) => done(None, Some(stats)),
                    Err(err) => done(Some(err), None),
                }
            });

        // On spawn failure the closure (and `done`) is dropped; the adapter
        // reports that as a transport failure.
        if let Err(err) = spawned {
            tracing::warn!(error = %err, "failed to start callback bundler worker");
        }
    }
}

struct Job {
    command: Vec<String>,
    options: BackendOptions,
    label: String,
}

impl Job {
    fn execute(&self, config: &ConfigTree) -> Result<CompilationStats, BackendError> {
        let (program, args) =
            split_command(&self.command).map_err(|e| BackendError::new(e.to_string()))?;

        let module = render_module(config, ModuleFormat::CommonJs, &self.options.cwd)
            .map_err(|e| BackendError::new(format!("failed to render config module: {e}")))?;
        // Removed when dropped, including on every early return below.
        let module_file = create_module_file(&self.options, &self.label, ModuleFormat::CommonJs).map_err(|e| {
            BackendError::new(format!(
                "failed to create config module in {}: {e}",
                self.options.cache_dir.display()
            ))
        })?;
        std::fs::write(&module_file, module)
            .map_err(|e| BackendError::new(format!("failed to write {}: {e}", module_file.display())))?;
        tracing::debug!(output = %self.label, module = %module_file.display(), "callback config written");

        let output = Command::new(program)
            .args(args)
            .arg("--config")
            .arg(&*module_file)
            .arg("--json")
            .current_dir(&self.options.cwd)
            .envs(self.options.child_env())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| BackendError::new(format!("failed to start `{program}`: {e}")))?;

        let shown = module_file.display().to_string();
        if let Err(err) = module_file.close() {
            tracing::debug!(module = %shown, error = %err, "config module not removed");
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            tracing::debug!(output = %self.label, "{line}");
        }

        // A failed compilation still prints stats, so parse before looking
        // at the exit status.
        match parse_stats(&output.stdout) {
            Some(stats) => Ok(stats),
            None => Err(BackendError {
                message: format!("`{program}` exited with {} without printing stats", output.status),
                details: Some(tail(&stderr, 20)),
            }),
        }
    }

}

/// Parse `--json` stats. Tolerates log lines printed ahead of the JSON.
fn parse_stats(stdout: &[u8]) -> Option<CompilationStats> {
    let text = String::from_utf8_lossy(stdout);
    let start = text.find('{')?;
    serde_json::from_str(&text[start..]).ok()
}
