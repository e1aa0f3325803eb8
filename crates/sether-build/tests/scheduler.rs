//! Scheduler behaviour against in-process fake backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sether_build::backend::{
    Artifact, BackendFailure, BackendOutput, BuildAdapter, CallbackAdapter, CallbackBundler,
    CompilationStats, Completion,
};
use sether_build::{aggregate, build_tasks, FailureKind, Scheduler, TaskObserver, TaskState};
use sether_config::{BackendKind, ConfigTree, NamedConfig};
use serde_json::{json, Value};

fn named(name: &str, backend: BackendKind, tree: Value) -> NamedConfig {
    NamedConfig::new(name, backend, serde_json::from_value(tree).unwrap())
}

fn callback_target(name: &str, filename: &str, behaviour: &str, delay_ms: u64) -> NamedConfig {
    named(
        name,
        BackendKind::CallbackBundler,
        json!({ "output": { "filename": filename }, "behaviour": behaviour, "delayMs": delay_ms }),
    )
}

/// Adapter steered by the `behaviour` key of the tree it receives.
#[derive(Default)]
struct ScriptedAdapter {
    invocations: AtomicUsize,
}

#[async_trait]
impl BuildAdapter for ScriptedAdapter {
    async fn invoke(&self, config: ConfigTree) -> Result<BackendOutput, BackendFailure> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let delay = config.get("delayMs").and_then(Value::as_u64).unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        let filename = config["output"]["filename"].as_str().unwrap_or("out.js").to_string();
        match config.get("behaviour").and_then(Value::as_str) {
            Some("transport") => Err(BackendFailure::transport("bundler process crashed")),
            Some("panic") => panic!("plugin blew up"),
            Some("warn") => Ok(BackendOutput {
                artifacts: vec![Artifact::bytes(filename.clone(), b"console.log(1);".to_vec())],
                warnings: vec![format!("{filename}: entrypoint size limit")],
            }),
            _ => Ok(BackendOutput {
                artifacts: vec![
                    Artifact::bytes(filename.clone(), b"module.exports = {};".to_vec()),
                    Artifact::bytes(format!("{filename}.map"), b"{}".to_vec()),
                ],
                warnings: Vec::new(),
            }),
        }
    }
}

fn scheduler(adapter: Arc<ScriptedAdapter>) -> Scheduler {
    Scheduler::new().with_adapter(BackendKind::CallbackBundler, adapter)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failure_is_isolated_and_order_is_kept() {
    let adapter = Arc::new(ScriptedAdapter::default());
    let tasks = build_tasks(vec![
        callback_target("one", "one.js", "ok", 60),
        callback_target("two", "two.js", "transport", 0),
        callback_target("three", "three.js", "ok", 10),
    ])
    .unwrap();

    let results = scheduler(adapter.clone()).run(tasks).await;

    assert_eq!(adapter.invocations.load(Ordering::SeqCst), 3);
    let ids: Vec<_> = results.iter().map(|r| r.output_id.as_str()).collect();
    assert_eq!(ids, vec!["one.js", "two.js", "three.js"]);

    assert!(results[0].success);
    assert!(results[2].success);
    assert_eq!(results[0].size_stats.len(), 1);
    assert_eq!(results[0].size_stats[0].label, "one.js");
    assert!(results[0].size_stats[0].gzip_bytes > 0);

    assert!(!results[1].success);
    assert!(results[1].size_stats.is_empty());
    let error = results[1].error.as_ref().unwrap();
    assert_eq!(error.kind, FailureKind::Transport);
    assert_eq!(error.message, "bundler process crashed");
}

#[tokio::test]
async fn panicking_task_becomes_failed_result() {
    let adapter = Arc::new(ScriptedAdapter::default());
    let tasks = build_tasks(vec![
        callback_target("ok", "ok.js", "ok", 0),
        callback_target("boom", "boom.js", "panic", 0),
    ])
    .unwrap();

    let results = scheduler(adapter).run(tasks).await;
    assert_eq!(results.len(), 2);
    assert!(results[0].success);
    assert_eq!(results[1].output_id, "boom.js");
    let error = results[1].error.as_ref().unwrap();
    assert_eq!(error.kind, FailureKind::Panicked);
    assert!(error.message.contains("plugin blew up"));
}

#[tokio::test]
async fn empty_run() {
    let results = Scheduler::new().run(Vec::new()).await;
    assert!(results.is_empty());
    assert!(aggregate(results).success);
}

#[tokio::test]
async fn missing_backend_fails_only_that_task() {
    let adapter = Arc::new(ScriptedAdapter::default());
    let tasks = build_tasks(vec![
        named("esm", BackendKind::StreamingBundler, json!({ "output": { "file": "dist/lib.esm.js" } })),
        callback_target("cjs", "lib.cjs.js", "ok", 0),
    ])
    .unwrap();

    let report = aggregate(scheduler(adapter).run(tasks).await);
    assert!(!report.success);
    assert!(report.results[1].success);
    assert_eq!(report.error.unwrap().kind, FailureKind::Transport);
}

#[tokio::test]
async fn collision_runs_nothing() {
    let adapter = Arc::new(ScriptedAdapter::default());
    let err = build_tasks(vec![
        callback_target("a", "bundle.js", "ok", 0),
        callback_target("b", "bundle.js", "ok", 0),
    ])
    .unwrap_err();

    assert!(matches!(err, sether_build::Error::OutputCollision { .. }));
    assert_eq!(adapter.invocations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn warnings_are_collected() {
    let adapter = Arc::new(ScriptedAdapter::default());
    let tasks = build_tasks(vec![
        callback_target("a", "a.js", "warn", 20),
        callback_target("b", "b.js", "warn", 0),
    ])
    .unwrap();

    let report = aggregate(scheduler(adapter).run(tasks).await);
    assert!(report.success);
    assert_eq!(
        report.warnings,
        vec!["a.js: entrypoint size limit", "b.js: entrypoint size limit"]
    );
}

/// Callback bundler that reports three compile errors.
struct ThreeErrors;

impl CallbackBundler for ThreeErrors {
    fn run(&self, _config: ConfigTree, done: Completion) {
        std::thread::spawn(move || {
            let stats: CompilationStats = serde_json::from_value(json!({
                "errors": ["Can't resolve './missing'", "second", "third"]
            }))
            .unwrap();
            done(None, Some(stats));
        });
    }
}

#[tokio::test]
async fn only_first_callback_error_is_reported() {
    let scheduler = Scheduler::new().with_adapter(
        BackendKind::CallbackBundler,
        Arc::new(CallbackAdapter::new(ThreeErrors)),
    );
    let tasks = build_tasks(vec![callback_target("cjs", "lib.cjs.js", "ok", 0)]).unwrap();

    let report = aggregate(scheduler.run(tasks).await);
    let error = report.results[0].error.as_ref().unwrap();
    assert_eq!(error.kind, FailureKind::Build);
    assert_eq!(error.message, "Can't resolve './missing'");
    assert_eq!(report.error.as_ref().unwrap().message, error.message);
}

#[derive(Default)]
struct Recorder(Mutex<Vec<(String, TaskState)>>);

impl TaskObserver for Recorder {
    fn on_state(&self, output_id: &str, state: TaskState) {
        self.0.lock().unwrap().push((output_id.to_string(), state));
    }
}

#[tokio::test]
async fn observer_sees_every_transition() {
    let recorder = Arc::new(Recorder::default());
    let scheduler = scheduler(Arc::new(ScriptedAdapter::default())).with_observer(recorder.clone());
    let tasks = build_tasks(vec![
        callback_target("a", "a.js", "ok", 0),
        callback_target("b", "b.js", "transport", 0),
    ])
    .unwrap();

    scheduler.run(tasks).await;

    let events = recorder.0.lock().unwrap().clone();
    for (id, terminal) in [("a.js", TaskState::Succeeded), ("b.js", TaskState::Failed)] {
        let states: Vec<_> = events
            .iter()
            .filter(|(event_id, _)| event_id == id)
            .map(|(_, state)| *state)
            .collect();
        assert_eq!(states, vec![TaskState::Pending, TaskState::Running, terminal]);
    }
}
