//! Shared helpers for command implementations.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, CliError, Result, ResultExt};

/// Resolve `path` against `cwd` unless it is already absolute.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// The project directory: `--cwd` resolved against the process directory,
/// or the process directory itself.
pub fn project_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    let root = match explicit {
        Some(dir) => resolve_path(dir, &current),
        None => current,
    };
    if !root.is_dir() {
        return Err(CliError::FileNotFound(root));
    }
    Ok(root)
}

/// Empty the output directory, keeping the directory itself.
///
/// Creates it when missing. Refuses to touch a path that is not a directory,
/// or one that is the project root or contains it.
pub fn clean_output_dir(out_dir: &Path, project_root: &Path) -> Result<()> {
    if !out_dir.exists() {
        return fs::create_dir_all(out_dir).with_path(out_dir);
    }
    if !out_dir.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Output path exists but is not a directory: {}",
            out_dir.display()
        )));
    }

    let out = fs::canonicalize(out_dir).with_path(out_dir)?;
    let root = fs::canonicalize(project_root).with_path(project_root)?;
    if root.starts_with(&out) {
        return Err(CliError::InvalidArgument(format!(
            "Refusing to clean {}: it contains the project at {}",
            out_dir.display(),
            project_root.display()
        )));
    }

    let failed = |source| BuildError::CleanFailed {
        path: out_dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(out_dir).map_err(failed)? {
        let path = entry.map_err(failed)?.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(failed)?;
    }
    Ok(())
}
