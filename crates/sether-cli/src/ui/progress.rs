//! Per-target progress spinners.

use std::collections::HashMap;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::{OwoColorize, Stream};
use sether_build::{format_duration, BuildResult, BuildTask, TaskObserver, TaskState};

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// One spinner per build target, driven by scheduler callbacks.
///
/// All bars are created before the run starts, so the observer only reads
/// the map and never needs a lock.
pub struct TaskProgress {
    multi: MultiProgress,
    bars: HashMap<String, ProgressBar>,
}

impl TaskProgress {
    /// Create spinners for `tasks`. Drawing is disabled when `visible` is false.
    pub fn new(tasks: &[BuildTask], visible: bool) -> Self {
        let target = if visible { ProgressDrawTarget::stderr() } else { ProgressDrawTarget::hidden() };
        let multi = MultiProgress::with_draw_target(target);

        let style = ProgressStyle::default_spinner()
            .template("  {spinner:.blue} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        let bars = tasks
            .iter()
            .map(|task| {
                let bar = multi.add(ProgressBar::new_spinner());
                bar.set_style(style.clone());
                bar.set_prefix(task.output_id.clone());
                bar.set_message(format!("{} (waiting)", task.name()));
                (task.output_id.clone(), bar)
            })
            .collect();

        Self { multi, bars }
    }

    /// Whether spinners should be drawn: attended terminal, not CI, not quiet.
    pub fn should_show(quiet: bool) -> bool {
        !quiet && console::user_attended_stderr() && !super::is_ci()
    }

    /// Remove every bar that is still drawn.
    pub fn clear(&self) {
        for bar in self.bars.values() {
            if !bar.is_finished() {
                bar.finish_and_clear();
            }
        }
        let _ = self.multi.clear();
    }

    #[cfg(test)]
    fn message(&self, output_id: &str) -> Option<String> {
        self.bars.get(output_id).map(|bar| bar.message())
    }
}

impl TaskObserver for TaskProgress {
    fn on_state(&self, output_id: &str, state: TaskState) {
        let Some(bar) = self.bars.get(output_id) else {
            return;
        };
        match state {
            TaskState::Pending => {}
            TaskState::Running => {
                bar.set_message("building");
                bar.enable_steady_tick(Duration::from_millis(80));
            }
            TaskState::Succeeded | TaskState::Failed => bar.disable_steady_tick(),
        }
    }

    fn on_finished(&self, result: &BuildResult) {
        let Some(bar) = self.bars.get(&result.output_id) else {
            return;
        };
        let took = format_duration(result.duration);
        let message = if result.success {
            format!("{} {took}", "✔".if_supports_color(Stream::Stderr, |t| t.green()))
        } else {
            format!("{} failed after {took}", "✗".if_supports_color(Stream::Stderr, |t| t.red()))
        };
        bar.finish_with_message(message);
    }
}

impl Drop for TaskProgress {
    fn drop(&mut self) {
        for bar in self.bars.values() {
            if !bar.is_finished() {
                bar.finish_and_clear();
            }
        }
    }
}
