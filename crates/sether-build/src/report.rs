//! Result aggregation and report rows.

use std::time::Duration;

use serde::Serialize;

use crate::result::{BuildResult, ErrorInfo};

/// Aggregated outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    /// Every task's result, in task declaration order.
    pub results: Vec<BuildResult>,
    /// `true` only if every task succeeded. An empty run succeeds.
    pub success: bool,
    /// All warnings, concatenated in task order.
    pub warnings: Vec<String>,
    /// Error of the first failing task, when the run failed.
    pub error: Option<ErrorInfo>,
}

/// Fold per-task results into a report.
///
/// Results are expected in declaration order, as returned by
/// [`Scheduler::run`](crate::Scheduler::run).
pub fn aggregate(results: Vec<BuildResult>) -> BuildReport {
    let success = results.iter().all(|r| r.success);
    let warnings = results
        .iter()
        .flat_map(|r| r.warnings.iter().cloned())
        .collect();
    let error = results
        .iter()
        .find(|r| !r.success)
        .and_then(|r| r.error.clone());

    BuildReport {
        results,
        success,
        warnings,
        error,
    }
}

/// One line of the size table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub file_name: String,
    pub human_size: String,
    pub gzip_size: String,
    pub duration_label: String,
}

impl BuildReport {
    /// One row per reported artifact, grouped by task in declaration order.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.results
            .iter()
            .flat_map(|result| {
                let duration = format_duration(result.duration);
                result.size_stats.iter().map(move |stat| ReportRow {
                    file_name: stat.label.clone(),
                    human_size: format_size(stat.bytes),
                    gzip_size: format_size(stat.gzip_bytes),
                    duration_label: duration.clone(),
                })
            })
            .collect()
    }

    pub fn failed(&self) -> impl Iterator<Item = &BuildResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

/// Human-readable byte count, e.g. `"1.50 KB"`.
///
/// ```
/// use sether_build::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    match unit {
        0 => format!("{bytes} B"),
        _ => format!("{size:.2} {}", UNITS[unit]),
    }
}

/// Human-readable duration: `"50ms"`, `"1.50s"` or `"1m 30s"`.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    match millis {
        0..=999 => format!("{millis}ms"),
        1000..=59_999 => format!("{:.2}s", duration.as_secs_f64()),
        _ => {
            let secs = duration.as_secs();
            format!("{}m {}s", secs / 60, secs % 60)
        }
    }
}
