//! Well-known project paths, resolved once from the working directory.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Source extensions, in the order they are tried.
pub const MODULE_FILE_EXTENSIONS: &[&str] = &["js", "ts", "json", "mjs", "jsx", "tsx"];

/// Output directory when `BUILD_DIR` is unset.
pub const DEFAULT_BUILD_DIR: &str = "dist";

/// Variable that overrides the output directory.
pub const BUILD_DIR_VAR: &str = "BUILD_DIR";

/// Configuration file candidates, first match wins.
pub const CONFIG_FILE_NAMES: &[&str] = &["sether.config.json", "sether.toml"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub app_path: PathBuf,
    pub app_build: PathBuf,
    /// `app_build` as configured, relative to the project root.
    pub app_build_dir: String,
    pub app_src: PathBuf,
    pub app_index_file: PathBuf,
    pub app_package_json: PathBuf,
    pub dotenv: PathBuf,
    pub browserslist_config: PathBuf,
    pub config_file: Option<PathBuf>,
    /// Scratch space for generated bundler config modules.
    pub cache_dir: PathBuf,
}

impl AppPaths {
    /// Resolve all paths relative to `cwd`.
    ///
    /// `build_dir` is the configured output directory (usually from
    /// `BUILD_DIR`); `None` means [`DEFAULT_BUILD_DIR`].
    pub fn resolve(cwd: &Path, build_dir: Option<&str>) -> Result<Self> {
        let root = cwd
            .canonicalize()
            .map_err(|_| ConfigError::RootNotFound(cwd.to_path_buf()))?;
        let build_dir = build_dir
            .filter(|dir| !dir.trim().is_empty())
            .unwrap_or(DEFAULT_BUILD_DIR)
            .to_string();

        let config_file = CONFIG_FILE_NAMES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file());

        Ok(Self {
            app_build: root.join(&build_dir),
            app_build_dir: build_dir,
            app_src: root.join("src"),
            app_index_file: resolve_module(&root, "src/index"),
            app_package_json: root.join("package.json"),
            dotenv: root.join(".env"),
            browserslist_config: root.join(".browserslistrc"),
            config_file,
            cache_dir: root.join("node_modules").join(".cache").join("sether"),
            app_path: root,
        })
    }

    pub fn has_browserslist_config(&self) -> bool {
        self.browserslist_config.is_file()
    }
}

/// Resolve `stem` against the first existing extension, defaulting to `.js`.
pub fn resolve_module(root: &Path, stem: &str) -> PathBuf {
    MODULE_FILE_EXTENSIONS
        .iter()
        .map(|ext| root.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| root.join(format!("{stem}.js")))
}
