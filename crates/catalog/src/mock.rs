// Mock storage engine with fault injection for testing
use crate::storage::{InMemoryIndexStorage, IndexStorage};
use async_trait::async_trait;
use dashmap::DashSet;
use indexward_core::{Error, IndexDescriptor, Namespace, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory storage that can be told to refuse specific indexes
#[derive(Debug, Default)]
pub struct MockIndexStorage {
    inner: InMemoryIndexStorage,
    failing_creates: DashSet<String>,
    failing_drops: DashSet<String>,
    creates: AtomicUsize,
    drops: AtomicUsize,
}

impl MockIndexStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future create of the named index fail
    pub fn fail_create_of(&self, name: impl Into<String>) {
        self.failing_creates.insert(name.into());
    }

    /// Make every future drop of the named index fail
    pub fn fail_drop_of(&self, name: impl Into<String>) {
        self.failing_drops.insert(name.into());
    }

    /// Clear all injected failures
    pub fn heal(&self) {
        self.failing_creates.clear();
        self.failing_drops.clear();
    }

    /// Successful create calls so far
    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Successful drop calls so far
    pub fn drop_calls(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }

    pub fn contains(&self, namespace: &Namespace, name: &str) -> bool {
        self.inner.contains(namespace, name)
    }
}

#[async_trait]
impl IndexStorage for MockIndexStorage {
    async fn create_index_data(
        &self,
        namespace: &Namespace,
        descriptor: &IndexDescriptor,
        background: bool,
    ) -> Result<()> {
        if self.failing_creates.contains(&descriptor.name) {
            return Err(Error::catalog_mutation(format!(
                "injected failure creating {} on {namespace}",
                descriptor.name
            )));
        }
        self.inner
            .create_index_data(namespace, descriptor, background)
            .await?;
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn drop_index_data(
        &self,
        namespace: &Namespace,
        descriptor: &IndexDescriptor,
    ) -> Result<()> {
        if self.failing_drops.contains(&descriptor.name) {
            return Err(Error::catalog_mutation(format!(
                "injected failure dropping {} on {namespace}",
                descriptor.name
            )));
        }
        self.inner.drop_index_data(namespace, descriptor).await?;
        self.drops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
