//! # sether-build
//!
//! Turns derived configurations into build tasks, runs them concurrently
//! against pluggable bundler backends and folds the outcomes into one report.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sether_build::{aggregate, build_tasks, Scheduler};
//! use sether_build::backend::{BackendOptions, CallbackAdapter, ProcessCallbackBundler};
//! use sether_config::{resolve_targets, BackendKind, LoadOptions, ResolvedConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ResolvedConfig::discover(".".as_ref(), &LoadOptions::default())?;
//! let tasks = build_tasks(resolve_targets(&config)?)?;
//!
//! let options = BackendOptions::from_config(&config);
//! let webpack = ProcessCallbackBundler::new(config.settings.bundlers.callback.clone(), options);
//! let scheduler = Scheduler::new().with_adapter(
//!     BackendKind::CallbackBundler,
//!     Arc::new(CallbackAdapter::new(webpack)),
//! );
//!
//! let report = aggregate(scheduler.run(tasks).await);
//! assert!(report.success);
//! # Ok(()) }
//! ```

pub mod backend;
pub mod report;
pub mod result;
pub mod scheduler;
pub mod sizes;
pub mod task;

pub use report::{aggregate, format_duration, format_size, BuildReport, ReportRow};
pub use result::{BuildResult, ErrorInfo, FailureKind, SizeStat, TaskState};
pub use scheduler::{Scheduler, TaskObserver};
pub use task::{build_tasks, output_id, BuildTask};

/// Error types for sether-build operations.
///
/// Failures of individual build tasks are not errors here; they are recorded
/// in the task's [`BuildResult`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two targets would write the same output file.
    #[error("Output collision: targets '{first}' and '{second}' both write '{output_id}'")]
    OutputCollision {
        output_id: String,
        first: String,
        second: String,
    },

    /// A target declares neither an output filename, file nor directory.
    #[error("Target '{name}' has no output filename, file or directory")]
    MissingOutput { name: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sether-build operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::OutputCollision { .. } => "OUTPUT_COLLISION",
            Error::MissingOutput { .. } => "MISSING_OUTPUT",
            Error::Io(_) => "IO_ERROR",
        }))
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::OutputCollision { .. } => Some(Box::new(
                "Give each target a distinct output.filename or output.file",
            )),
            Error::MissingOutput { .. } => Some(Box::new(
                "Set output.filename (callback bundler) or output.file / output.dir (streaming bundler)",
            )),
            Error::Io(_) => None,
        }
    }
}
