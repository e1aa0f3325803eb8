//! Optional `.env` file support.
//!
//! Values are parsed into a map and handed around explicitly; nothing here
//! touches the process environment.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{ConfigError, Result};

/// Variables loaded from a project's `.env` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    path: Option<PathBuf>,
    vars: IndexMap<String, String>,
}

impl EnvFile {
    /// Load `path` if it exists. A missing file yields an empty set.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }

        let iter = dotenvy::from_path_iter(path).map_err(|e| invalid(path, e))?;
        let mut vars = IndexMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| invalid(path, e))?;
            vars.insert(key, value);
        }

        tracing::debug!(path = %path.display(), count = vars.len(), "loaded env file");
        Ok(Self {
            path: Some(path.to_path_buf()),
            vars,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn vars(&self) -> &IndexMap<String, String> {
        &self.vars
    }

    /// Process environment first, then this file.
    pub fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .or_else(|| self.get(key).map(str::to_string))
    }
}

fn invalid(path: &Path, err: dotenvy::Error) -> ConfigError {
    ConfigError::InvalidEnvFile {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
