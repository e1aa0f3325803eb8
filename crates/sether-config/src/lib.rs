//! Configuration for the sether build CLI.
//!
//! - [`merge`](mod@merge) - deep merge engine and merge strategy registry
//! - [`derive`](mod@derive) - named configuration variants from one base
//! - [`config`] - layered settings loading
//! - [`targets`] - the project's concrete build targets

pub mod config;
pub mod defaults;
pub mod derive;
pub mod env;
pub mod error;
pub mod manifest;
pub mod merge;
pub mod paths;
pub mod settings;
pub mod targets;

pub use config::{load_configuration, LoadOptions, ResolvedConfig, ENV_PREFIX};
pub use derive::{derive, BackendKind, BuiltinTarget, NamedConfig, UserOverrides};
pub use env::EnvFile;
pub use error::{ConfigError, Result};
pub use manifest::PackageManifest;
pub use merge::{
    merge, merge_all, ConfigTree, DefaultResolver, MergeKey, MergeResolver, MergeStrategy,
    StrategyTable,
};
pub use paths::{AppPaths, BUILD_DIR_VAR, DEFAULT_BUILD_DIR, MODULE_FILE_EXTENSIONS};
pub use settings::{AnalyzerMode, BundlerCommands, SetherConfig};
pub use targets::{resolve_targets, resolve_targets_with};
