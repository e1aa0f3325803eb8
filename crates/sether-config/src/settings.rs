//! Project settings read from `sether.config.json` / `sether.toml`.

use serde::{Deserialize, Serialize};

use crate::merge::ConfigTree;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetherConfig {
    /// Project name used for output file names. Defaults to the package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Build an ES module bundle with the streaming bundler.
    #[serde(default)]
    pub esm: bool,

    /// Build a CommonJS bundle with the callback bundler.
    #[serde(default = "default_true")]
    pub cjs: bool,

    /// Build a UMD bundle with the callback bundler.
    #[serde(default = "default_true")]
    pub umd: bool,

    #[serde(default)]
    pub analyzer_mode: AnalyzerMode,

    /// Babel targets, used when the project has no `.browserslistrc`.
    #[serde(default = "default_browserslist")]
    pub browserslist: Vec<String>,

    /// Node polyfill overrides: `true` keeps the default polyfill, a string
    /// replaces it, `false` disables it.
    #[serde(default)]
    pub polyfill_node_deps: ConfigTree,

    /// Callback bundler overrides (`baseConfig`, `cjsConfig`, `umdConfig`, extras).
    #[serde(default)]
    pub webpack: ConfigTree,

    /// Streaming bundler overrides (`baseConfig`, `esmConfig`, extras).
    #[serde(default)]
    pub rollup: ConfigTree,

    #[serde(default)]
    pub bundlers: BundlerCommands,
}

impl Default for SetherConfig {
    fn default() -> Self {
        Self {
            name: None,
            esm: false,
            cjs: true,
            umd: true,
            analyzer_mode: AnalyzerMode::default(),
            browserslist: default_browserslist(),
            polyfill_node_deps: ConfigTree::new(),
            webpack: ConfigTree::new(),
            rollup: ConfigTree::new(),
            bundlers: BundlerCommands::default(),
        }
    }
}

/// Bundle analyzer report mode for the UMD build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerMode {
    #[default]
    Disabled,
    Static,
    Server,
    Json,
}

impl AnalyzerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerMode::Disabled => "disabled",
            AnalyzerMode::Static => "static",
            AnalyzerMode::Server => "server",
            AnalyzerMode::Json => "json",
        }
    }
}

/// Commands that launch the two bundler backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerCommands {
    #[serde(default = "default_streaming_command")]
    pub streaming: Vec<String>,

    #[serde(default = "default_callback_command")]
    pub callback: Vec<String>,
}

impl Default for BundlerCommands {
    fn default() -> Self {
        Self {
            streaming: default_streaming_command(),
            callback: default_callback_command(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_browserslist() -> Vec<String> {
    vec!["defaults".to_string()]
}

fn default_streaming_command() -> Vec<String> {
    vec!["npx".to_string(), "rollup".to_string()]
}

fn default_callback_command() -> Vec<String> {
    vec!["npx".to_string(), "webpack".to_string()]
}
