use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use sether_config::ConfigTree;
use tokio::sync::oneshot;

use super::{Artifact, BackendFailure, BackendOutput, BuildAdapter};

/// Transport-level error reported through the completion callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub message: String,
    pub details: Option<String>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }
}

/// A compiler message: either plain text or a structured record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StatsMessage {
    Text(String),
    Detailed {
        message: String,
        #[serde(default, rename = "moduleName")]
        module_name: Option<String>,
    },
}

impl StatsMessage {
    /// Module name on its own line above the message, when known.
    pub fn format(&self) -> String {
        match self {
            StatsMessage::Text(text) => text.clone(),
            StatsMessage::Detailed {
                message,
                module_name: Some(module),
            } => format!("{module}\n{message}"),
            StatsMessage::Detailed { message, .. } => message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatsAsset {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

/// Structured stats payload of a finished compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationStats {
    #[serde(default)]
    pub errors: Vec<StatsMessage>,
    #[serde(default)]
    pub warnings: Vec<StatsMessage>,
    #[serde(default)]
    pub assets: Vec<StatsAsset>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

/// Completion callback. Consumed on the first call.
pub type Completion = Box<dyn FnOnce(Option<BackendError>, Option<CompilationStats>) + Send + 'static>;

/// A bundler that reports completion through a callback (webpack-shaped).
pub trait CallbackBundler: Send + Sync {
    /// Start compiling `config`; `done` is invoked when it finishes.
    fn run(&self, config: ConfigTree, done: Completion);
}

/// [`BuildAdapter`] for a [`CallbackBundler`].
pub struct CallbackAdapter<B> {
    bundler: B,
}

impl<B: CallbackBundler> CallbackAdapter<B> {
    pub fn new(bundler: B) -> Self {
        Self { bundler }
    }
}

#[async_trait]
impl<B: CallbackBundler> BuildAdapter for CallbackAdapter<B> {
    async fn invoke(&self, config: ConfigTree) -> Result<BackendOutput, BackendFailure> {
        let configured_path = config
            .get("output")
            .and_then(|output| output.get("path"))
            .and_then(|path| path.as_str())
            .map(PathBuf::from);

        let (tx, rx) = oneshot::channel();
        self.bundler.run(
            config,
            Box::new(move |err, stats| {
                let _ = tx.send((err, stats));
            }),
        );

        let (err, stats) = rx
            .await
            .map_err(|_| BackendFailure::transport("callback bundler finished without reporting"))?;

        let stats = match (err, stats) {
            (Some(err), _) => {
                return Err(BackendFailure::Transport {
                    message: err.message,
                    details: err.details,
                });
            }
            (None, None) => {
                return Err(BackendFailure::transport("callback bundler returned no stats"));
            }
            (None, Some(stats)) => stats,
        };

        // Only the first error is kept. The rest usually restate it.
        if let Some(first) = stats.errors.first() {
            if stats.errors.len() > 1 {
                tracing::debug!(suppressed = stats.errors.len() - 1, "dropping follow-up compile errors");
            }
            return Err(BackendFailure::Build(first.format()));
        }

        let output_path = stats.output_path.or(configured_path).unwrap_or_default();
        Ok(BackendOutput {
            artifacts: stats
                .assets
                .iter()
                .map(|asset| Artifact::file(asset.name.clone(), output_path.join(&asset.name)))
                .collect(),
            warnings: stats.warnings.iter().map(StatsMessage::format).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Completes inline with a canned outcome.
    struct Canned(Option<BackendError>, Option<CompilationStats>);

    impl CallbackBundler for Canned {
        fn run(&self, _config: ConfigTree, done: Completion) {
            done(self.0.clone(), self.1.clone());
        }
    }

    /// Drops the callback without calling it.
    struct Forgetful;

    impl CallbackBundler for Forgetful {
        fn run(&self, _config: ConfigTree, _done: Completion) {}
    }

    fn stats(value: serde_json::Value) -> CompilationStats {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn first_error_only() {
        let adapter = CallbackAdapter::new(Canned(
            None,
            Some(stats(json!({
                "errors": [
                    { "message": "Module not found: 'left-pad'", "moduleName": "./src/index.ts" },
                    "second",
                    "third"
                ]
            }))),
        ));

        let err = adapter.invoke(ConfigTree::new()).await.unwrap_err();
        assert_eq!(err, BackendFailure::Build("./src/index.ts\nModule not found: 'left-pad'".to_string()));
    }

    #[tokio::test]
    async fn error_without_stats_is_transport() {
        let adapter = CallbackAdapter::new(Canned(Some(BackendError::new("ENOENT")), None));
        let err = adapter.invoke(ConfigTree::new()).await.unwrap_err();
        assert_eq!(err.kind(), crate::FailureKind::Transport);
        assert_eq!(err.to_string(), "ENOENT");

        let adapter = CallbackAdapter::new(Canned(None, None));
        let err = adapter.invoke(ConfigTree::new()).await.unwrap_err();
        assert_eq!(err.kind(), crate::FailureKind::Transport);
    }

    #[tokio::test]
    async fn dropped_callback_is_transport() {
        let err = CallbackAdapter::new(Forgetful)
            .invoke(ConfigTree::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::FailureKind::Transport);
    }

    #[tokio::test]
    async fn assets_resolve_against_output_path() {
        let adapter = CallbackAdapter::new(Canned(
            None,
            Some(stats(json!({
                "warnings": ["asset size limit: lib.umd.min.js (300 KiB)"],
                "assets": [{ "name": "lib.umd.min.js", "size": 1024 }]
            }))),
        ));
        let config: ConfigTree = serde_json::from_value(json!({ "output": { "path": "/p/dist" } })).unwrap();

        let output = adapter.invoke(config).await.unwrap();
        assert_eq!(output.warnings, vec!["asset size limit: lib.umd.min.js (300 KiB)"]);
        assert_eq!(
            output.artifacts,
            vec![Artifact::file("lib.umd.min.js", "/p/dist/lib.umd.min.js")]
        );
    }
}
