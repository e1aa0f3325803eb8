//! Derivation of named build configurations.
//!
//! One merged base produces several named variants: the built-in targets
//! (each gated by a feature flag) followed by any extra targets the user
//! declares. Built-ins receive their own specialized defaults, extras only
//! the generic base.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::merge::{merge, ConfigTree, MergeResolver};

/// Key holding the shared base inside a bundler override section.
pub const SHARED_BASE_KEY: &str = "baseConfig";

/// Suffix of per-target override keys (`cjsConfig`, `umdConfig`, ...).
pub const TARGET_KEY_SUFFIX: &str = "Config";

/// Completion-signalling contract of the backend that runs a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackendKind {
    /// Generate-then-write backend (rollup-shaped).
    StreamingBundler,
    /// Completion-callback backend (webpack-shaped).
    CallbackBundler,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::StreamingBundler => f.write_str("streaming"),
            BackendKind::CallbackBundler => f.write_str("callback"),
        }
    }
}

/// A fully resolved configuration tagged with its target name and backend.
///
/// Immutable once derived. Consumers take ownership or call
/// [`NamedConfig::fresh_tree`]; no two build tasks share a tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedConfig {
    name: String,
    backend: BackendKind,
    tree: ConfigTree,
}

impl NamedConfig {
    pub fn new(name: impl Into<String>, backend: BackendKind, tree: ConfigTree) -> Self {
        Self {
            name: name.into(),
            backend,
            tree,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    /// Deep copy of the tree for a single backend invocation.
    pub fn fresh_tree(&self) -> ConfigTree {
        self.tree.clone()
    }

    pub fn into_tree(self) -> ConfigTree {
        self.tree
    }
}

/// A target that is always available and only gated by a flag.
#[derive(Debug, Clone)]
pub struct BuiltinTarget {
    pub name: String,
    pub backend: BackendKind,
    pub enabled: bool,
    /// Target-specific defaults, applied beneath the shared base.
    pub defaults: ConfigTree,
}

impl BuiltinTarget {
    pub fn new(name: impl Into<String>, backend: BackendKind, enabled: bool, defaults: ConfigTree) -> Self {
        Self {
            name: name.into(),
            backend,
            enabled,
            defaults,
        }
    }
}

/// User-supplied overrides for one bundler family.
#[derive(Debug, Clone, PartialEq)]
pub struct UserOverrides {
    /// Applied to every target of the family.
    pub shared_base: ConfigTree,
    /// Applied to the built-in target with the same name.
    pub by_name: IndexMap<String, ConfigTree>,
    /// Additional targets, in declaration order.
    pub extra: IndexMap<String, ConfigTree>,
    /// Backend that runs the extra targets.
    pub extra_backend: BackendKind,
}

impl Default for UserOverrides {
    fn default() -> Self {
        Self {
            shared_base: ConfigTree::new(),
            by_name: IndexMap::new(),
            extra: IndexMap::new(),
            extra_backend: BackendKind::CallbackBundler,
        }
    }
}

impl UserOverrides {
    /// Split a bundler override section into shared base, per-target
    /// overrides and extra targets.
    ///
    /// `baseConfig` is the shared base, `<name>Config` for each built-in
    /// name is that target's override, and every other key declares an
    /// extra target. Null entries are treated as absent.
    ///
    /// # Example
    ///
    /// ```
    /// use sether_config::{BackendKind, ConfigTree, UserOverrides};
    /// use serde_json::json;
    ///
    /// let section: ConfigTree = serde_json::from_value(json!({
    ///     "baseConfig": { "devtool": false },
    ///     "umdConfig": { "output": { "library": { "name": "Lib" } } },
    ///     "legacy": { "output": { "filename": "lib.legacy.js" } }
    /// })).unwrap();
    ///
    /// let overrides = UserOverrides::from_section("webpack", &section, &["cjs", "umd"], BackendKind::CallbackBundler).unwrap();
    /// assert_eq!(overrides.shared_base["devtool"], json!(false));
    /// assert!(overrides.by_name.contains_key("umd"));
    /// assert_eq!(overrides.extra.keys().collect::<Vec<_>>(), vec!["legacy"]);
    /// ```
    pub fn from_section(
        section_name: &str,
        section: &ConfigTree,
        builtin_names: &[&str],
        extra_backend: BackendKind,
    ) -> Result<Self> {
        let mut overrides = UserOverrides {
            extra_backend,
            ..Default::default()
        };

        for (key, value) in section {
            let Some(tree) = as_override(section_name, key, value)? else {
                continue;
            };

            if key == SHARED_BASE_KEY {
                overrides.shared_base = tree;
            } else if let Some(target) = builtin_names
                .iter()
                .find(|name| key.strip_suffix(TARGET_KEY_SUFFIX) == Some(**name))
            {
                overrides.by_name.insert((*target).to_string(), tree);
            } else {
                overrides.extra.insert(key.clone(), tree);
            }
        }

        Ok(overrides)
    }
}

fn as_override(section: &str, key: &str, value: &Value) -> Result<Option<ConfigTree>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map.clone())),
        _ => Err(ConfigError::InvalidOverride {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

/// Derive the named configurations for one bundler family.
///
/// For an enabled built-in `n` the tree is
/// `merge(merge(n.defaults, shared), overrides.by_name[n])`, where
/// `shared = merge(base_defaults, overrides.shared_base)`. Each extra `e`
/// gets `merge(shared, overrides.extra[e])`.
///
/// Output order: enabled built-ins in the order given, then extras in
/// declaration order. A tree whose `output` is an array yields one
/// configuration per output entry. No enabled built-ins and no extras
/// yields an empty list.
pub fn derive(
    base_defaults: &ConfigTree,
    builtins: &[BuiltinTarget],
    overrides: &UserOverrides,
    resolver: &dyn MergeResolver,
) -> Vec<NamedConfig> {
    let shared = merge(base_defaults, &overrides.shared_base, resolver);
    let empty = ConfigTree::new();
    let mut configs = Vec::new();

    for builtin in builtins.iter().filter(|b| b.enabled) {
        let per_name = overrides.by_name.get(&builtin.name).unwrap_or(&empty);
        let tree = merge(&merge(&builtin.defaults, &shared, resolver), per_name, resolver);
        tracing::debug!(target_name = %builtin.name, backend = %builtin.backend, "derived built-in target");
        push_split(&mut configs, &builtin.name, builtin.backend, tree);
    }

    for (name, extra) in &overrides.extra {
        let tree = merge(&shared, extra, resolver);
        tracing::debug!(target_name = %name, backend = %overrides.extra_backend, "derived extra target");
        push_split(&mut configs, name, overrides.extra_backend, tree);
    }

    configs
}

fn push_split(configs: &mut Vec<NamedConfig>, name: &str, backend: BackendKind, mut tree: ConfigTree) {
    let outputs = match tree.get("output") {
        Some(Value::Array(outputs)) if !outputs.is_empty() => outputs.clone(),
        _ => {
            configs.push(NamedConfig::new(name, backend, tree));
            return;
        }
    };

    if outputs.len() == 1 {
        tree.insert("output".to_string(), outputs.into_iter().next().unwrap_or(Value::Null));
        configs.push(NamedConfig::new(name, backend, tree));
        return;
    }

    for (idx, output) in outputs.into_iter().enumerate() {
        let mut single = tree.clone();
        single.insert("output".to_string(), output);
        configs.push(NamedConfig::new(format!("{name}[{idx}]"), backend, single));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::StrategyTable;
    use serde_json::json;

    fn tree(value: Value) -> ConfigTree {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn from_section_rejects_non_object_overrides() {
        let section = tree(json!({ "legacy": [1, 2] }));
        let err = UserOverrides::from_section("webpack", &section, &["cjs"], BackendKind::CallbackBundler)
            .unwrap_err();
        assert!(err.to_string().contains("webpack.legacy"));
    }

    #[test]
    fn from_section_skips_null_entries() {
        let section = tree(json!({ "baseConfig": null, "cjsConfig": null, "legacy": null }));
        let overrides =
            UserOverrides::from_section("webpack", &section, &["cjs"], BackendKind::CallbackBundler).unwrap();
        assert_eq!(overrides, UserOverrides::default());
    }

    #[test]
    fn unknown_target_config_key_is_an_extra() {
        let section = tree(json!({ "iifeConfig": { "output": { "filename": "x.js" } } }));
        let overrides =
            UserOverrides::from_section("webpack", &section, &["cjs", "umd"], BackendKind::CallbackBundler)
                .unwrap();
        assert!(overrides.by_name.is_empty());
        assert!(overrides.extra.contains_key("iifeConfig"));
    }

    #[test]
    fn output_arrays_split_into_one_config_per_output() {
        let builtins = [BuiltinTarget::new(
            "esm",
            BackendKind::StreamingBundler,
            true,
            tree(json!({
                "input": "src/index.ts",
                "output": [{ "file": "dist/a.esm.js" }, { "file": "dist/a.mjs" }]
            })),
        )];

        let configs = derive(&ConfigTree::new(), &builtins, &UserOverrides::default(), &StrategyTable::new());
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].name(), "esm[0]");
        assert_eq!(configs[0].tree()["output"], json!({ "file": "dist/a.esm.js" }));
        assert_eq!(configs[1].tree()["output"], json!({ "file": "dist/a.mjs" }));
        assert_eq!(configs[1].tree()["input"], json!("src/index.ts"));
    }

    #[test]
    fn single_output_array_is_unwrapped() {
        let builtins = [BuiltinTarget::new(
            "esm",
            BackendKind::StreamingBundler,
            true,
            tree(json!({ "output": [{ "file": "dist/a.esm.js" }] })),
        )];

        let configs = derive(&ConfigTree::new(), &builtins, &UserOverrides::default(), &StrategyTable::new());
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].name(), "esm");
        assert_eq!(configs[0].tree()["output"], json!({ "file": "dist/a.esm.js" }));
    }

    #[test]
    fn fresh_trees_do_not_share_state() {
        let config = NamedConfig::new("cjs", BackendKind::CallbackBundler, tree(json!({ "plugins": [1] })));
        let mut copy = config.fresh_tree();
        copy.insert("plugins".to_string(), json!([]));
        assert_eq!(config.tree()["plugins"], json!([1]));
    }
}
