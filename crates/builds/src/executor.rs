//! Launching build tasks
//!
//! The registry only does bookkeeping. An executor decides where a registered build
//! actually runs; the physical build itself sits behind [`IndexBuilder`].

use crate::registry::BuildHandle;
use async_trait::async_trait;
use indexward_catalog::CollectionResolver;
use indexward_core::{BuildRecord, Error, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Starts the task for a freshly registered build
pub trait BuildExecutor: Send + Sync {
    fn launch(&self, handle: BuildHandle) -> Result<()>;
}

/// Performs the physical work of one background build
#[async_trait]
pub trait IndexBuilder: Send + Sync {
    async fn build(&self, handle: &BuildHandle) -> Result<()>;
}

/// Registers builds without running them, for setups where something else drives them
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBuildExecutor;

impl BuildExecutor for NoopBuildExecutor {
    fn launch(&self, _handle: BuildHandle) -> Result<()> {
        Ok(())
    }
}

/// Runs each build as a tokio task, racing it against cancellation
pub struct TokioBuildExecutor {
    builder: Arc<dyn IndexBuilder>,
}

impl TokioBuildExecutor {
    pub fn new(builder: Arc<dyn IndexBuilder>) -> Self {
        Self { builder }
    }
}

impl BuildExecutor for TokioBuildExecutor {
    fn launch(&self, mut handle: BuildHandle) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::scheduling(format!("no runtime to run index build: {e}")))?;
        let builder = Arc::clone(&self.builder);

        runtime.spawn(async move {
            let record = handle.record().clone();
            let cancellation = handle.take_cancellation();
            let outcome = tokio::select! {
                biased;
                _ = cancellation.cancelled() => None,
                result = builder.build(&handle) => Some(result),
            };

            match outcome {
                None => info!(
                    namespace = %record.namespace,
                    index = %record.index_name(),
                    "Background index build stopped after cancellation"
                ),
                Some(Ok(())) => {
                    if handle.complete() {
                        info!(
                            namespace = %record.namespace,
                            index = %record.index_name(),
                            "Background index build finished"
                        );
                    }
                }
                Some(Err(e)) => {
                    warn!(
                        namespace = %record.namespace,
                        index = %record.index_name(),
                        "Background index build failed: {e}"
                    );
                    handle.complete();
                }
            }
        });
        Ok(())
    }
}

/// Builder that adds the index to its collection's catalog once storage is built
pub struct CatalogIndexBuilder {
    resolver: Arc<dyn CollectionResolver>,
}

impl CatalogIndexBuilder {
    pub fn new(resolver: Arc<dyn CollectionResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl IndexBuilder for CatalogIndexBuilder {
    async fn build(&self, handle: &BuildHandle) -> Result<()> {
        let record: &BuildRecord = handle.record();
        let collection = self
            .resolver
            .resolve(&record.namespace)
            .ok_or_else(|| Error::namespace_not_found(record.namespace.to_string()))?;

        let mut catalog = collection.write_catalog().await;
        let _commit = handle.begin_commit();
        catalog
            .create_index(record.descriptor.clone(), true)
            .await
    }
}
