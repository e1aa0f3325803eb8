//! Concurrent build scheduler.
//!
//! Every task is spawned up front on a [`JoinSet`] and the caller waits for
//! all of them. Failures stay with the task that produced them: nothing is
//! cancelled, a panicking task becomes a failed result, and the returned
//! results follow task declaration order whatever the completion order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sether_config::BackendKind;
use tokio::task::JoinSet;

use crate::backend::{BackendFailure, BuildAdapter};
use crate::result::{BuildResult, ErrorInfo, FailureKind, TaskState};
use crate::sizes;
use crate::task::BuildTask;

/// Receives task lifecycle updates, e.g. to drive progress output.
///
/// Called from the tasks themselves, so implementations must be cheap and
/// thread-safe.
pub trait TaskObserver: Send + Sync {
    fn on_state(&self, output_id: &str, state: TaskState);

    fn on_finished(&self, _result: &BuildResult) {}
}

/// Runs build tasks against the adapter registered for their backend kind.
#[derive(Default, Clone)]
pub struct Scheduler {
    adapters: HashMap<BackendKind, Arc<dyn BuildAdapter>>,
    observer: Option<Arc<dyn TaskObserver>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapter(mut self, kind: BackendKind, adapter: Arc<dyn BuildAdapter>) -> Self {
        self.adapters.insert(kind, adapter);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn TaskObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run all tasks concurrently and return one result per task, in task
    /// order.
    pub async fn run(&self, tasks: Vec<BuildTask>) -> Vec<BuildResult> {
        let order: Vec<String> = tasks.iter().map(|t| t.output_id.clone()).collect();
        if order.is_empty() {
            return Vec::new();
        }

        if let Some(observer) = &self.observer {
            for id in &order {
                observer.on_state(id, TaskState::Pending);
            }
        }
        tracing::info!(tasks = order.len(), "starting builds");

        let mut join_set = JoinSet::new();
        let mut spawned = HashMap::with_capacity(order.len());
        for task in tasks {
            let output_id = task.output_id.clone();
            let adapter = self.adapters.get(&task.backend).cloned();
            let observer = self.observer.clone();

            let handle = join_set.spawn(execute(task, adapter, observer));
            spawned.insert(handle.id(), output_id);
        }

        let mut results: HashMap<String, BuildResult> = HashMap::with_capacity(order.len());
        while let Some(joined) = join_set.join_next_with_id().await {
            match joined {
                Ok((_, result)) => {
                    results.insert(result.output_id.clone(), result);
                }
                Err(err) => {
                    let output_id = spawned.remove(&err.id()).unwrap_or_default();
                    let message = if err.is_panic() {
                        panic_message(err.into_panic())
                    } else {
                        err.to_string()
                    };
                    tracing::error!(output = %output_id, "build task panicked: {message}");

                    let result = BuildResult::failed(
                        output_id.clone(),
                        Duration::ZERO,
                        ErrorInfo::new(FailureKind::Panicked, format!("build task panicked: {message}")),
                    );
                    if let Some(observer) = &self.observer {
                        observer.on_state(&output_id, TaskState::Failed);
                        observer.on_finished(&result);
                    }
                    results.insert(output_id, result);
                }
            }
        }

        order
            .into_iter()
            .filter_map(|id| results.remove(&id))
            .collect()
    }
}

async fn execute(
    task: BuildTask,
    adapter: Option<Arc<dyn BuildAdapter>>,
    observer: Option<Arc<dyn TaskObserver>>,
) -> BuildResult {
    let BuildTask {
        output_id,
        backend,
        config,
    } = task;

    if let Some(observer) = &observer {
        observer.on_state(&output_id, TaskState::Running);
    }
    tracing::debug!(output = %output_id, %backend, target_name = config.name(), "build started");

    let started = Instant::now();
    let outcome = match adapter {
        Some(adapter) => adapter.invoke(config.into_tree()).await,
        None => Err(BackendFailure::transport(format!(
            "no {backend} bundler backend is registered"
        ))),
    };
    let elapsed = started.elapsed();

    let result = match outcome {
        Ok(output) => match sizes::measure(&output.artifacts).await {
            Ok(stats) => BuildResult::succeeded(output_id, elapsed, stats, output.warnings),
            Err(err) => BuildResult::failed(
                output_id,
                elapsed,
                ErrorInfo::new(FailureKind::Transport, format!("failed to read build output: {err}")),
            ),
        },
        Err(failure) => BuildResult::failed(output_id, elapsed, failure.into_error_info()),
    };

    match &result.error {
        None => tracing::debug!(output = %result.output_id, ms = elapsed.as_millis() as u64, "build succeeded"),
        Some(error) => tracing::warn!(output = %result.output_id, kind = %error.kind, "build failed: {}", error.message),
    }

    if let Some(observer) = &observer {
        observer.on_state(&result.output_id, result.state());
        observer.on_finished(&result);
    }
    result
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
