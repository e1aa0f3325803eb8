use async_trait::async_trait;
use sether_config::ConfigTree;

use super::{Artifact, BackendFailure, BackendOutput, BuildAdapter};

/// A generate-then-write bundler (rollup-shaped).
#[async_trait]
pub trait StreamingBundler: Send + Sync {
    /// Prepare a bundle for `config`.
    async fn open(&self, config: ConfigTree) -> Result<Box<dyn StreamingBundle>, BackendFailure>;
}

/// One open bundle. Stages are called in order: `generate`, `write`, `close`.
#[async_trait]
pub trait StreamingBundle: Send {
    async fn generate(&mut self) -> Result<(), BackendFailure>;

    /// Materialize the output and list what was written.
    async fn write(&mut self) -> Result<Vec<Artifact>, BackendFailure>;

    async fn close(&mut self) -> Result<(), BackendFailure>;

    fn warnings(&self) -> Vec<String> {
        Vec::new()
    }
}

/// [`BuildAdapter`] for a [`StreamingBundler`].
pub struct StreamingAdapter<B> {
    bundler: B,
}

impl<B: StreamingBundler> StreamingAdapter<B> {
    pub fn new(bundler: B) -> Self {
        Self { bundler }
    }
}

#[async_trait]
impl<B: StreamingBundler> BuildAdapter for StreamingAdapter<B> {
    async fn invoke(&self, config: ConfigTree) -> Result<BackendOutput, BackendFailure> {
        let mut bundle = self.bundler.open(config).await?;

        let staged = match bundle.generate().await {
            Ok(()) => bundle.write().await,
            Err(err) => Err(err),
        };

        // the bundle is closed on every path; a close error only matters
        // when nothing failed before it
        let closed = bundle.close().await;
        let artifacts = staged?;
        closed?;

        Ok(BackendOutput {
            artifacts,
            warnings: bundle.warnings(),
        })
    }
}
