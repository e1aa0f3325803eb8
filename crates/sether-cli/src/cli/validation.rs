/// Validate a project name given on the command line.
///
/// The name ends up in output file names, so it must be non-empty and free
/// of path separators.
pub fn parse_name(s: &str) -> Result<String, String> {
    let name = s.trim();
    if name.is_empty() {
        return Err("Project name cannot be empty".to_string());
    }
    if name.contains(['/', '\\']) {
        return Err(format!("Project name '{name}' cannot contain path separators"));
    }
    if name.starts_with('.') {
        return Err(format!("Project name '{name}' cannot start with '.'"));
    }
    Ok(name.to_string())
}
