//! Artifact size statistics.

use std::io::Write as _;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::backend::{Artifact, ArtifactSource};
use crate::result::SizeStat;

/// Extensions that appear in the report. Source maps, images and other
/// assets are omitted.
pub const REPORTED_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "css"];

pub fn is_reported_asset(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| REPORTED_EXTENSIONS.contains(&ext))
}

/// Gzipped length of `bytes` at best compression.
pub fn gzip_size(bytes: &[u8]) -> std::io::Result<u64> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?.len() as u64)
}

pub fn measure_bytes(label: impl Into<String>, bytes: &[u8]) -> std::io::Result<SizeStat> {
    Ok(SizeStat {
        label: label.into(),
        bytes: bytes.len() as u64,
        gzip_bytes: gzip_size(bytes)?,
    })
}

/// Size statistics for the reportable artifacts, in emission order.
///
/// Compression runs on the blocking pool so large bundles do not stall the
/// scheduler's other tasks.
pub async fn measure(artifacts: &[Artifact]) -> std::io::Result<Vec<SizeStat>> {
    let mut stats = Vec::new();
    for artifact in artifacts.iter().filter(|a| is_reported_asset(&a.file_name)) {
        let bytes = match &artifact.source {
            ArtifactSource::Bytes(bytes) => bytes.clone(),
            ArtifactSource::File(path) => tokio::fs::read(path).await?,
        };
        let label = artifact.file_name.clone();
        let stat = tokio::task::spawn_blocking(move || measure_bytes(label, &bytes))
            .await
            .map_err(std::io::Error::other)??;
        stats.push(stat);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_extensions() {
        assert!(is_reported_asset("lib.cjs.js"));
        assert!(is_reported_asset("lib.mjs"));
        assert!(is_reported_asset("styles.css"));
        assert!(!is_reported_asset("lib.cjs.js.map"));
        assert!(!is_reported_asset("logo.png"));
        assert!(!is_reported_asset("LICENSE"));
    }

    #[test]
    fn gzip_shrinks_repetitive_input() {
        let input = "export const a = 1;\n".repeat(200);
        let stat = measure_bytes("a.js", input.as_bytes()).unwrap();
        assert_eq!(stat.bytes, input.len() as u64);
        assert!(stat.gzip_bytes > 0);
        assert!(stat.gzip_bytes < stat.bytes);
    }

    #[tokio::test]
    async fn measure_skips_maps_and_reads_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lib.umd.min.js");
        std::fs::write(&path, "var a=1;").unwrap();

        let stats = measure(&[
            Artifact::file("lib.umd.min.js", path),
            Artifact::bytes("lib.umd.min.js.map", b"{}".to_vec()),
            Artifact::bytes("lib.css", b"a{}".to_vec()),
        ])
        .await
        .unwrap();

        let labels: Vec<_> = stats.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["lib.umd.min.js", "lib.css"]);
        assert_eq!(stats[0].bytes, 8);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn measure_matches_direct_gzip() {
        let input = "export default function widget() { return 1; }\n".repeat(500);
        let expected = gzip_size(input.as_bytes()).unwrap();

        let stats = measure(&[Artifact::bytes("widget.js", input.clone().into_bytes())])
            .await
            .unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].bytes, input.len() as u64);
        assert_eq!(stats[0].gzip_bytes, expected);
    }
}
