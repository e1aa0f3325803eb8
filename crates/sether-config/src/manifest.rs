//! The subset of `package.json` the build reads.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    #[serde(default)]
    pub peer_dependencies: IndexMap<String, String>,
}

impl PackageManifest {
    /// Read `package.json`. A missing file yields an empty manifest.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no package manifest");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidManifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Package name without its npm scope (`@org/pkg` -> `pkg`).
    pub fn unscoped_name(&self) -> Option<String> {
        let name = self.name.as_deref()?.trim();
        let bare = name.rsplit('/').next().unwrap_or(name);
        (!bare.is_empty()).then(|| bare.to_string())
    }

    /// Runtime dependency names, then peer dependency names.
    pub fn external_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.dependencies.keys().cloned().collect();
        for peer in self.peer_dependencies.keys() {
            if !names.contains(peer) {
                names.push(peer.clone());
            }
        }
        names
    }
}
