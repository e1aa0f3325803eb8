//! Task graph: one schedulable unit of work per derived configuration.

use std::path::Path;

use indexmap::IndexMap;
use sether_config::{BackendKind, ConfigTree, NamedConfig};
use serde_json::Value;

use crate::{Error, Result};

/// One unit of work. Produces exactly one [`BuildResult`](crate::BuildResult).
#[derive(Debug, Clone, PartialEq)]
pub struct BuildTask {
    /// Short label for the task's output, unique across a run.
    pub output_id: String,
    pub backend: BackendKind,
    pub config: NamedConfig,
}

impl BuildTask {
    pub fn name(&self) -> &str {
        self.config.name()
    }
}

/// Map configurations 1:1 onto tasks, preserving order.
///
/// Fails before anything runs when two configurations resolve to the same
/// output id or when one declares no output at all.
pub fn build_tasks(configs: Vec<NamedConfig>) -> Result<Vec<BuildTask>> {
    let mut seen: IndexMap<String, String> = IndexMap::with_capacity(configs.len());
    let mut tasks = Vec::with_capacity(configs.len());

    for config in configs {
        let id = output_id(config.tree()).ok_or_else(|| Error::MissingOutput {
            name: config.name().to_string(),
        })?;

        if let Some(first) = seen.get(&id) {
            return Err(Error::OutputCollision {
                output_id: id,
                first: first.clone(),
                second: config.name().to_string(),
            });
        }
        seen.insert(id.clone(), config.name().to_string());

        tracing::debug!(target_name = config.name(), output_id = %id, backend = %config.backend(), "task collated");
        tasks.push(BuildTask {
            output_id: id,
            backend: config.backend(),
            config,
        });
    }

    Ok(tasks)
}

/// Basename of the tree's declared output.
///
/// Looks at `output.filename`, then `output.file`, then `output.dir`.
pub fn output_id(tree: &ConfigTree) -> Option<String> {
    let output = tree.get("output")?.as_object()?;

    ["filename", "file", "dir"]
        .iter()
        .filter_map(|key| output.get(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty())
        .map(basename)
}

fn basename(value: &str) -> String {
    Path::new(value)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> ConfigTree {
        serde_json::from_value(value).unwrap()
    }

    fn config(name: &str, output: Value) -> NamedConfig {
        NamedConfig::new(name, BackendKind::CallbackBundler, tree(json!({ "output": output })))
    }

    #[test]
    fn output_id_prefers_filename_then_file_then_dir() {
        assert_eq!(
            output_id(&tree(json!({ "output": { "filename": "lib.cjs.js", "path": "/p/dist" } }))),
            Some("lib.cjs.js".to_string())
        );
        assert_eq!(
            output_id(&tree(json!({ "output": { "file": "/p/dist/lib.esm.js" } }))),
            Some("lib.esm.js".to_string())
        );
        assert_eq!(
            output_id(&tree(json!({ "output": { "dir": "/p/dist/chunks/" } }))),
            Some("chunks".to_string())
        );
        assert_eq!(output_id(&tree(json!({ "output": {} }))), None);
        assert_eq!(output_id(&tree(json!({}))), None);
    }

    #[test]
    fn keeps_order_and_backend() {
        let tasks = build_tasks(vec![
            config("cjs", json!({ "filename": "lib.cjs.js" })),
            config("umd", json!({ "filename": "lib.umd.min.js" })),
        ])
        .unwrap();

        let ids: Vec<_> = tasks.iter().map(|t| t.output_id.as_str()).collect();
        assert_eq!(ids, vec!["lib.cjs.js", "lib.umd.min.js"]);
        assert_eq!(tasks[1].name(), "umd");
        assert_eq!(tasks[1].backend, BackendKind::CallbackBundler);
    }

    #[test]
    fn collision_on_basename() {
        let err = build_tasks(vec![
            config("a", json!({ "filename": "bundle.js" })),
            config("b", json!({ "filename": "nested/bundle.js" })),
        ])
        .unwrap_err();

        match err {
            Error::OutputCollision { output_id, first, second } => {
                assert_eq!(output_id, "bundle.js");
                assert_eq!(first, "a");
                assert_eq!(second, "b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_output_is_rejected() {
        let err = build_tasks(vec![config("legacy", json!({ "path": "/p/dist" }))]).unwrap_err();
        assert!(matches!(err, Error::MissingOutput { name } if name == "legacy"));
    }

    #[test]
    fn empty_input() {
        assert!(build_tasks(Vec::new()).unwrap().is_empty());
    }
}
