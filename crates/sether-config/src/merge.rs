//! Deep merge engine for configuration trees.
//!
//! [`merge`] walks two trees key by key. At every key present on both sides
//! the [`MergeResolver`] is consulted first; when it declines (`None`) the
//! type-based default applies: objects recurse, everything else (arrays
//! included) is replaced by the override.
//!
//! Key-specific behaviour is declared in a [`StrategyTable`], which maps a
//! key name or a dotted key path to a [`MergeStrategy`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Hierarchical configuration value with no fixed schema.
///
/// Key order is preserved, so derived configurations and reports come out
/// in declaration order.
pub type ConfigTree = Map<String, Value>;

/// The key a resolver is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeKey<'a> {
    /// Last path segment, e.g. `rules`.
    pub name: &'a str,
    /// Dotted path from the tree root, e.g. `module.rules`.
    pub path: &'a str,
}

/// Per-key conflict resolution hook.
///
/// Returning `None` selects the default merge behaviour for the key.
pub trait MergeResolver {
    fn resolve(&self, base: &Value, over: &Value, key: MergeKey<'_>) -> Option<Value>;
}

impl<F> MergeResolver for F
where
    F: Fn(&Value, &Value, &str) -> Option<Value>,
{
    fn resolve(&self, base: &Value, over: &Value, key: MergeKey<'_>) -> Option<Value> {
        self(base, over, key.name)
    }
}

/// Resolver that always defers to the default behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResolver;

impl MergeResolver for DefaultResolver {
    fn resolve(&self, _base: &Value, _over: &Value, _key: MergeKey<'_>) -> Option<Value> {
        None
    }
}

/// Merge `over` into a copy of `base`.
///
/// Neither input is modified and the result never aliases either of them.
///
/// # Example
///
/// ```
/// use sether_config::{merge, ConfigTree, StrategyTable};
/// use serde_json::json;
///
/// let base: ConfigTree = serde_json::from_value(json!({ "plugins": [1, 2], "rules": [1, 2] })).unwrap();
/// let over: ConfigTree = serde_json::from_value(json!({ "plugins": [3], "rules": [3] })).unwrap();
/// let table = StrategyTable::new().union("plugins");
///
/// let merged = merge(&base, &over, &table);
/// assert_eq!(merged["plugins"], json!([1, 2, 3]));
/// assert_eq!(merged["rules"], json!([3]));
/// ```
pub fn merge(base: &ConfigTree, over: &ConfigTree, resolver: &dyn MergeResolver) -> ConfigTree {
    merge_at(base, over, resolver, "")
}

/// Merge a sequence of trees left to right.
///
/// `merge_all(&[a, b, c], r)` is `merge(&merge(a, b, r), c, r)`. The order is
/// part of the result: later trees win.
pub fn merge_all(trees: &[&ConfigTree], resolver: &dyn MergeResolver) -> ConfigTree {
    trees
        .iter()
        .fold(ConfigTree::new(), |acc, tree| merge(&acc, tree, resolver))
}

fn merge_at(
    base: &ConfigTree,
    over: &ConfigTree,
    resolver: &dyn MergeResolver,
    prefix: &str,
) -> ConfigTree {
    let mut out = base.clone();

    for (key, over_value) in over {
        let path = join_path(prefix, key);
        let merged = match base.get(key) {
            None => over_value.clone(),
            Some(base_value) => merge_value(base_value, over_value, resolver, key, &path),
        };
        out.insert(key.clone(), merged);
    }

    out
}

fn merge_value(
    base: &Value,
    over: &Value,
    resolver: &dyn MergeResolver,
    name: &str,
    path: &str,
) -> Value {
    if let Some(resolved) = resolver.resolve(base, over, MergeKey { name, path }) {
        return resolved;
    }

    match (base, over) {
        (Value::Object(base_map), Value::Object(over_map)) => {
            Value::Object(merge_at(base_map, over_map, resolver, path))
        }
        _ => over.clone(),
    }
}

/// Element-wise merge used by [`MergeStrategy::DeepMerge`] on arrays.
fn merge_elements(base: &[Value], over: &[Value], resolver: &dyn MergeResolver, path: &str) -> Vec<Value> {
    let len = base.len().max(over.len());
    (0..len)
        .map(|idx| match (base.get(idx), over.get(idx)) {
            (Some(Value::Object(b)), Some(Value::Object(o))) => {
                Value::Object(merge_at(b, o, resolver, path))
            }
            (_, Some(o)) => o.clone(),
            (Some(b), None) => b.clone(),
            (None, None) => Value::Null,
        })
        .collect()
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Named merge behaviour for a registered key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeStrategy {
    /// Override wins, whatever the types.
    Replace,
    /// Arrays are concatenated, base first. Other types use the default.
    Union,
    /// Objects recurse, arrays merge element by element.
    DeepMerge,
}

/// Registry of key-specific merge strategies.
///
/// Lookups try the full dotted path first, then the bare key name, so
/// `"resolve.plugins"` can override a table-wide `"plugins"` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyTable {
    entries: IndexMap<String, MergeStrategy>,
}

impl StrategyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategies used for bundler configurations: plugin and rule lists
    /// accumulate, every other array is replaced.
    pub fn bundler_defaults() -> Self {
        Self::new().union("plugins").union("rules")
    }

    pub fn with(mut self, key: impl Into<String>, strategy: MergeStrategy) -> Self {
        self.insert(key, strategy);
        self
    }

    pub fn union(self, key: impl Into<String>) -> Self {
        self.with(key, MergeStrategy::Union)
    }

    pub fn insert(&mut self, key: impl Into<String>, strategy: MergeStrategy) -> Option<MergeStrategy> {
        self.entries.insert(key.into(), strategy)
    }

    pub fn lookup(&self, key: MergeKey<'_>) -> Option<MergeStrategy> {
        self.entries
            .get(key.path)
            .or_else(|| self.entries.get(key.name))
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, MergeStrategy)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MergeResolver for StrategyTable {
    fn resolve(&self, base: &Value, over: &Value, key: MergeKey<'_>) -> Option<Value> {
        match self.lookup(key)? {
            MergeStrategy::Replace => Some(over.clone()),
            MergeStrategy::Union => match (base, over) {
                (Value::Array(b), Value::Array(o)) => {
                    Some(Value::Array(b.iter().chain(o.iter()).cloned().collect()))
                }
                // a null override leaves the accumulated list alone
                (Value::Array(_), Value::Null) => Some(base.clone()),
                _ => None,
            },
            MergeStrategy::DeepMerge => match (base, over) {
                (Value::Array(b), Value::Array(o)) => {
                    Some(Value::Array(merge_elements(b, o, self, key.path)))
                }
                _ => None,
            },
        }
    }
}
