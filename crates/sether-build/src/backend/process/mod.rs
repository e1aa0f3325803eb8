//! Backends that drive the JavaScript bundlers as child processes.
//!
//! Each invocation writes its resolved tree as a config module into the
//! cache directory and points the bundler's CLI at it. Descriptor objects
//! (`$regex`, `$plugin`, `$resolve`) are revived by the module itself.

mod rollup;
mod webpack;

use std::io;
use std::path::Path;

use sether_config::ConfigTree;
use tempfile::TempPath;

use super::{BackendFailure, BackendOptions};

pub use rollup::ProcessStreamingBundler;
pub use webpack::ProcessCallbackBundler;

/// Module system of a generated config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFormat {
    Esm,
    CommonJs,
}

impl ModuleFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ModuleFormat::Esm => "mjs",
            ModuleFormat::CommonJs => "cjs",
        }
    }
}

const REVIVER: &str = r#"const revive = (value) => {
  if (Array.isArray(value)) return value.map(revive);
  if (value === null || typeof value !== "object") return value;
  if (typeof value.$regex === "string") return new RegExp(value.$regex, value.$flags || "");
  if (typeof value.$resolve === "string") return load.resolve(value.$resolve);
  if (typeof value.$plugin === "string") {
    let target = load(value.$plugin);
    for (const part of (value.$export || "").split(".").filter(Boolean)) target = target[part];
    if (typeof target !== "function" && target && typeof target.default === "function") target = target.default;
    const options = revive(value.$options);
    return value.$construct === false ? target(options) : new target(options);
  }
  return Object.fromEntries(Object.entries(value).map(([key, inner]) => [key, revive(inner)]));
};
"#;

/// Render `tree` as a config module. Modules are required relative to
/// `project_root`.
pub fn render_module(tree: &ConfigTree, format: ModuleFormat, project_root: &Path) -> serde_json::Result<String> {
    let config = serde_json::to_string_pretty(tree)?;
    let anchor = serde_json::to_string(&project_root.join("package.json").to_string_lossy())?;

    let mut out = String::new();
    match format {
        ModuleFormat::Esm => {
            out.push_str("import { createRequire } from \"node:module\";\n");
        }
        ModuleFormat::CommonJs => {
            out.push_str("const { createRequire } = require(\"node:module\");\n");
        }
    }
    out.push_str(&format!("const load = createRequire({anchor});\n"));
    out.push_str(REVIVER);
    out.push_str(&format!("const config = {config};\n"));
    match format {
        ModuleFormat::Esm => out.push_str("export default revive(config);\n"),
        ModuleFormat::CommonJs => out.push_str("module.exports = revive(config);\n"),
    }
    Ok(out)
}

fn sanitize(target: &str) -> String {
    target
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}

/// Create the generated config module file for one target in the cache dir.
///
/// The name is the sanitized target plus a random part, so targets that
/// sanitize to the same stem still get their own file. The file is removed
/// when the returned path is dropped or closed.
pub fn create_module_file(options: &BackendOptions, target: &str, format: ModuleFormat) -> io::Result<TempPath> {
    std::fs::create_dir_all(&options.cache_dir)?;
    let prefix = format!("{}.", sanitize(target));
    let suffix = format!(".config.{}", format.extension());
    let file = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(&suffix)
        .tempfile_in(&options.cache_dir)?;
    Ok(file.into_temp_path())
}

/// Split a configured command into program and leading arguments.
pub(crate) fn split_command(command: &[String]) -> Result<(&str, &[String]), BackendFailure> {
    match command.split_first() {
        Some((program, args)) if !program.trim().is_empty() => Ok((program.as_str(), args)),
        _ => Err(BackendFailure::transport("bundler command is empty")),
    }
}

/// Last `n` lines of captured output, for failure details.
pub(crate) fn tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn esm_module_exports_revived_config() {
        let tree: ConfigTree = serde_json::from_value(json!({
            "external": [{ "$regex": "^@babel/runtime" }]
        }))
        .unwrap();

        let module = render_module(&tree, ModuleFormat::Esm, Path::new("/p")).unwrap();
        assert!(module.starts_with("import { createRequire }"));
        assert!(module.contains("createRequire(\"/p/package.json\")"));
        assert!(module.contains("\"$regex\": \"^@babel/runtime\""));
        assert!(module.trim_end().ends_with("export default revive(config);"));
    }

    #[test]
    fn commonjs_module_assigns_exports() {
        let module = render_module(&ConfigTree::new(), ModuleFormat::CommonJs, Path::new("/p")).unwrap();
        assert!(module.contains("module.exports = revive(config);"));
        assert!(!module.contains("export default"));
    }

    #[test]
    fn module_files_are_sanitized_and_distinct() {
        let dir = tempfile::TempDir::new().unwrap();
        let options = BackendOptions::new(dir.path(), dir.path().join("cache"));

        let plus = create_module_file(&options, "a+b.js", ModuleFormat::CommonJs).unwrap();
        let underscore = create_module_file(&options, "a_b.js", ModuleFormat::CommonJs).unwrap();
        assert_ne!(plus.to_path_buf(), underscore.to_path_buf());

        for path in [&plus, &underscore] {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("a_b.js."), "{name}");
            assert!(name.ends_with(".config.cjs"), "{name}");
            assert_eq!(path.parent(), Some(options.cache_dir.as_path()));
        }

        let esm = create_module_file(&options, "umd[1]", ModuleFormat::Esm).unwrap();
        let esm_path = esm.to_path_buf();
        assert!(esm_path.to_string_lossy().ends_with(".config.mjs"));
        assert!(esm_path.file_name().unwrap().to_string_lossy().starts_with("umd_1_."));

        drop(esm);
        assert!(!esm_path.exists());
    }

    #[test]
    fn command_splitting() {
        let command = vec!["npx".to_string(), "rollup".to_string()];
        let (program, args) = split_command(&command).unwrap();
        assert_eq!(program, "npx");
        assert_eq!(args, ["rollup".to_string()]);
        assert!(split_command(&[]).is_err());
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail("a", 5), "a");
    }
}
