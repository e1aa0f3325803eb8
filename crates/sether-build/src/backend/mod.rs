//! Bundler backends.
//!
//! The scheduler only knows [`BuildAdapter`]: hand over a configuration tree,
//! await exactly one outcome. Each backend kind gets one adapter that maps its
//! own completion protocol onto that contract:
//!
//! - [`StreamingAdapter`] drives a generate-then-write [`StreamingBundler`]
//! - [`CallbackAdapter`] turns a completion callback ([`CallbackBundler`])
//!   into a future

mod callback;
pub mod process;
mod streaming;

use std::path::PathBuf;

use async_trait::async_trait;
use indexmap::IndexMap;
use sether_config::{ConfigTree, ResolvedConfig};

use crate::result::{ErrorInfo, FailureKind};

pub use callback::{
    BackendError, CallbackAdapter, CallbackBundler, Completion, CompilationStats, StatsAsset,
    StatsMessage,
};
pub use process::{ProcessCallbackBundler, ProcessStreamingBundler};
pub use streaming::{StreamingAdapter, StreamingBundle, StreamingBundler};

/// Where an artifact's content lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

/// One file emitted by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub source: ArtifactSource,
}

impl Artifact {
    pub fn bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            source: ArtifactSource::Bytes(bytes),
        }
    }

    pub fn file(file_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            source: ArtifactSource::File(path.into()),
        }
    }
}

/// What a successful backend invocation produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendOutput {
    pub artifacts: Vec<Artifact>,
    pub warnings: Vec<String>,
}

/// A failed backend invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendFailure {
    /// The invocation itself failed and produced no stats.
    #[error("{message}")]
    Transport {
        message: String,
        details: Option<String>,
    },

    /// The backend completed and reported a compile error.
    #[error("{0}")]
    Build(String),
}

impl BackendFailure {
    pub fn transport(message: impl Into<String>) -> Self {
        BackendFailure::Transport {
            message: message.into(),
            details: None,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            BackendFailure::Transport { .. } => FailureKind::Transport,
            BackendFailure::Build(_) => FailureKind::Build,
        }
    }

    pub fn into_error_info(self) -> ErrorInfo {
        match self {
            BackendFailure::Transport { message, details } => {
                let info = ErrorInfo::new(FailureKind::Transport, message);
                match details {
                    Some(details) => info.with_details(details),
                    None => info,
                }
            }
            BackendFailure::Build(message) => ErrorInfo::new(FailureKind::Build, message),
        }
    }
}

/// Uniform asynchronous contract the scheduler drives.
///
/// Every call resolves exactly once. The tree is owned by the invocation and
/// never shared with another task.
#[async_trait]
pub trait BuildAdapter: Send + Sync {
    async fn invoke(&self, config: ConfigTree) -> Result<BackendOutput, BackendFailure>;
}

/// Explicit settings handed to backend invocations.
///
/// Bundler mode and `.env` values reach child processes through these
/// fields, not through this process's environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOptions {
    pub mode: String,
    pub env: IndexMap<String, String>,
    /// Project root; child processes run here.
    pub cwd: PathBuf,
    /// Where generated config modules are written.
    pub cache_dir: PathBuf,
}

impl BackendOptions {
    pub fn new(cwd: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: "production".to_string(),
            env: IndexMap::new(),
            cwd: cwd.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        let mut options = Self::new(&config.paths.app_path, &config.paths.cache_dir);
        options.env = config.env.vars().clone();
        options
    }

    /// Environment for a child process: `.env` values, then the mode
    /// variables, which always win.
    pub fn child_env(&self) -> IndexMap<String, String> {
        let mut env = self.env.clone();
        env.insert("NODE_ENV".to_string(), self.mode.clone());
        env.insert("BABEL_ENV".to_string(), self.mode.clone());
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_overrides_env_file() {
        let mut options = BackendOptions::new("/p", "/p/node_modules/.cache/sether");
        options.env.insert("NODE_ENV".to_string(), "development".to_string());
        options.env.insert("API_URL".to_string(), "https://example.test".to_string());

        let env = options.child_env();
        assert_eq!(env["NODE_ENV"], "production");
        assert_eq!(env["BABEL_ENV"], "production");
        assert_eq!(env["API_URL"], "https://example.test");
    }

    #[test]
    fn failure_kinds() {
        let info = BackendFailure::Transport {
            message: "spawn failed".to_string(),
            details: Some("ENOENT".to_string()),
        }
        .into_error_info();
        assert_eq!(info.kind, FailureKind::Transport);
        assert_eq!(info.details.as_deref(), Some("ENOENT"));

        assert_eq!(BackendFailure::Build("boom".to_string()).kind(), FailureKind::Build);
    }
}
