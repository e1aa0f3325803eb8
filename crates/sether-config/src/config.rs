//! Configuration loading.
//!
//! Settings are layered with figment. Priority: CLI > environment
//! (`SETHER_*`) > config file > defaults. Loading happens once, in the
//! entry point, and the resulting [`ResolvedConfig`] is passed down
//! explicitly.

use std::path::Path;

use figment::{
    providers::{Env, Format as _, Json, Serialized, Toml},
    Figment,
};

use crate::env::EnvFile;
use crate::error::{ConfigError, Result};
use crate::manifest::PackageManifest;
use crate::paths::{AppPaths, BUILD_DIR_VAR};
use crate::settings::SetherConfig;

/// Prefix of environment variables that override settings.
pub const ENV_PREFIX: &str = "SETHER_";

/// Values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub name: Option<String>,
}

/// Everything a build needs to know about the project.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Effective project name.
    pub name: String,
    pub paths: AppPaths,
    pub settings: SetherConfig,
    pub manifest: PackageManifest,
    pub env: EnvFile,
}

impl ResolvedConfig {
    /// Resolve paths from `cwd`, read `.env`, then load the configuration.
    ///
    /// `BUILD_DIR` is taken from the process environment first, then from
    /// the project's `.env`.
    pub fn discover(cwd: &Path, options: &LoadOptions) -> Result<Self> {
        let root = cwd
            .canonicalize()
            .map_err(|_| ConfigError::RootNotFound(cwd.to_path_buf()))?;
        let env = EnvFile::load(&root.join(".env"))?;
        let build_dir = env.lookup(BUILD_DIR_VAR);
        let paths = AppPaths::resolve(&root, build_dir.as_deref())?;

        load_configuration(paths, env, options)
    }
}

/// Load settings and the package manifest for already-resolved paths.
pub fn load_configuration(paths: AppPaths, env: EnvFile, options: &LoadOptions) -> Result<ResolvedConfig> {
    let mut figment = Figment::new().merge(Serialized::defaults(SetherConfig::default()));

    if let Some(path) = &paths.config_file {
        tracing::debug!(path = %path.display(), "loading config file");
        figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => figment.merge(Toml::file(path)),
            _ => figment.merge(Json::file(path)),
        };
    }

    // SETHER_ANALYZER_MODE -> analyzerMode
    figment = figment.merge(Env::prefixed(ENV_PREFIX).map(|key| snake_to_camel(key.as_str()).into()));

    if let Some(name) = &options.name {
        figment = figment.merge(Serialized::default("name", name));
    }

    let settings: SetherConfig = figment.extract()?;
    let manifest = PackageManifest::load(&paths.app_package_json)?;

    let name = settings
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| manifest.unscoped_name())
        .ok_or(ConfigError::MissingName)?;

    tracing::info!(
        name = %name,
        esm = settings.esm,
        cjs = settings.cjs,
        umd = settings.umd,
        "configuration loaded"
    );

    Ok(ResolvedConfig {
        name,
        paths,
        settings,
        manifest,
        env,
    })
}

fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for ch in key.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
