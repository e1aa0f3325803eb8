use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use sether_config::ConfigTree;
use tempfile::TempPath;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use super::{create_module_file, render_module, split_command, tail, ModuleFormat};
use crate::backend::{Artifact, BackendFailure, BackendOptions, StreamingBundle, StreamingBundler};
use crate::task::output_id;

/// Runs the streaming bundler's CLI (`<command> --config <module>`).
#[derive(Debug, Clone)]
pub struct ProcessStreamingBundler {
    command: Vec<String>,
    options: BackendOptions,
}

impl ProcessStreamingBundler {
    pub fn new(command: Vec<String>, options: BackendOptions) -> Self {
        Self { command, options }
    }
}

#[async_trait]
impl StreamingBundler for ProcessStreamingBundler {
    async fn open(&self, config: ConfigTree) -> Result<Box<dyn StreamingBundle>, BackendFailure> {
        split_command(&self.command)?;

        let label = output_id(&config).unwrap_or_else(|| "bundle".to_string());
        let module = render_module(&config, ModuleFormat::Esm, &self.options.cwd)
            .map_err(|e| BackendFailure::transport(format!("failed to render config module: {e}")))?;
        let module_file = create_module_file(&self.options, &label, ModuleFormat::Esm).map_err(|e| {
            BackendFailure::transport(format!(
                "failed to create config module in {}: {e}",
                self.options.cache_dir.display()
            ))
        })?;

        write_module(&module_file, &module).await?;
        tracing::debug!(output = %label, module = %module_file.display(), "streaming config written");

        Ok(Box::new(ProcessBundle {
            command: self.command.clone(),
            options: self.options.clone(),
            target: OutputTarget::from_config(&config, &self.options.cwd),
            label,
            module_file: Some(module_file),
            warnings: Vec::new(),
        }))
    }
}

async fn write_module(path: &Path, contents: &str) -> Result<(), BackendFailure> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| BackendFailure::transport(format!("failed to write {}: {e}", path.display())))
}

/// Where the bundle's output lands.
#[derive(Debug, Clone)]
enum OutputTarget {
    File(PathBuf),
    Dir(PathBuf),
    Unknown,
}

impl OutputTarget {
    fn from_config(config: &ConfigTree, cwd: &Path) -> Self {
        let output = config.get("output").and_then(|o| o.as_object());
        let field = |key: &str| {
            output
                .and_then(|o| o.get(key))
                .and_then(|v| v.as_str())
                .map(|v| cwd.join(v))
        };

        if let Some(file) = field("file") {
            OutputTarget::File(file)
        } else if let Some(dir) = field("dir") {
            OutputTarget::Dir(dir)
        } else {
            OutputTarget::Unknown
        }
    }
}

struct ProcessBundle {
    command: Vec<String>,
    options: BackendOptions,
    target: OutputTarget,
    label: String,
    /// Removed on close, or on drop if close never runs.
    module_file: Option<TempPath>,
    warnings: Vec<String>,
}

#[async_trait]
impl StreamingBundle for ProcessBundle {
    async fn generate(&mut self) -> Result<(), BackendFailure> {
        let (program, args) = split_command(&self.command)?;
        let module_file = self
            .module_file
            .as_deref()
            .ok_or_else(|| BackendFailure::transport("config module was already removed"))?;

        let mut child = Command::new(program)
            .args(args)
            .arg("--config")
            .arg(module_file)
            .current_dir(&self.options.cwd)
            .envs(self.options.child_env())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BackendFailure::transport(format!("failed to start `{program}`: {e}")))?;

        let mut captured = String::new();
        if let Some(stderr) = child.stderr.take() {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!(output = %self.label, "{line}");
                if let Some(warning) = line.trim_start().strip_prefix("(!)") {
                    self.warnings.push(warning.trim().to_string());
                }
                captured.push_str(&line);
                captured.push('\n');
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| BackendFailure::transport(format!("failed to wait for `{program}`: {e}")))?;

        if !status.success() {
            return Err(BackendFailure::Transport {
                message: format!("`{program}` exited with {status}"),
                details: Some(tail(&captured, 20)),
            });
        }
        Ok(())
    }

    async fn write(&mut self) -> Result<Vec<Artifact>, BackendFailure> {
        match &self.target {
            OutputTarget::File(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| self.label.clone());
                Ok(vec![Artifact::file(name, path.clone())])
            }
            OutputTarget::Dir(dir) => collect_dir(dir)
                .await
                .map_err(|e| BackendFailure::transport(format!("failed to read {}: {e}", dir.display()))),
            OutputTarget::Unknown => Ok(Vec::new()),
        }
    }

    async fn close(&mut self) -> Result<(), BackendFailure> {
        if let Some(module_file) = self.module_file.take() {
            let shown = module_file.display().to_string();
            if let Err(err) = module_file.close() {
                tracing::debug!(module = %shown, error = %err, "config module not removed");
            }
        }
        Ok(())
    }

    fn warnings(&self) -> Vec<String> {
        self.warnings.clone()
    }
}

/// Files under `dir`, named relative to it, sorted for a stable report.
async fn collect_dir(dir: &Path) -> std::io::Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
                continue;
            }
            let name = path
                .strip_prefix(dir)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned();
            artifacts.push(Artifact::file(name, path));
        }
    }

    artifacts.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(artifacts)
}
