//! Per-task outcome records.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Lifecycle of a single task. `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

/// Why a task failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The backend invocation itself failed, with no structured stats.
    Transport,
    /// The backend finished and reported compile errors.
    Build,
    /// The task panicked.
    Panicked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport failure"),
            FailureKind::Build => write!(f, "build failure"),
            FailureKind::Panicked => write!(f, "task panicked"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub kind: FailureKind,
    pub message: String,
    /// Extra diagnostic text (backend stderr, stack), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorInfo {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        if !details.trim().is_empty() {
            self.details = Some(details);
        }
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Size of one emitted artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeStat {
    /// Artifact file name.
    pub label: String,
    pub bytes: u64,
    pub gzip_bytes: u64,
}

/// Outcome of one [`BuildTask`](crate::BuildTask). Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildResult {
    pub output_id: String,
    pub success: bool,
    pub duration: Duration,
    /// Empty for failed tasks.
    pub size_stats: Vec<SizeStat>,
    pub warnings: Vec<String>,
    pub error: Option<ErrorInfo>,
}

impl BuildResult {
    pub fn succeeded(
        output_id: impl Into<String>,
        duration: Duration,
        size_stats: Vec<SizeStat>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            output_id: output_id.into(),
            success: true,
            duration,
            size_stats,
            warnings,
            error: None,
        }
    }

    pub fn failed(output_id: impl Into<String>, duration: Duration, error: ErrorInfo) -> Self {
        Self {
            output_id: output_id.into(),
            success: false,
            duration,
            size_stats: Vec::new(),
            warnings: Vec::new(),
            error: Some(error),
        }
    }

    pub fn state(&self) -> TaskState {
        if self.success {
            TaskState::Succeeded
        } else {
            TaskState::Failed
        }
    }
}
