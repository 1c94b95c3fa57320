//! Storage engine boundary for index data
//!
//! The catalog only owns descriptors. Building and discarding the physical index
//! structure is delegated to an [`IndexStorage`] implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use indexward_core::{IndexDescriptor, Namespace, Result};

/// Trait for the physical side of index lifecycle operations
#[async_trait]
pub trait IndexStorage: Send + Sync {
    /// Build (or allocate, for background builds) the data for a new index
    async fn create_index_data(
        &self,
        namespace: &Namespace,
        descriptor: &IndexDescriptor,
        background: bool,
    ) -> Result<()>;

    /// Release the data held by an index
    async fn drop_index_data(&self, namespace: &Namespace, descriptor: &IndexDescriptor)
        -> Result<()>;
}

/// Storage engine that keeps nothing but the set of materialized indexes
#[derive(Debug, Default)]
pub struct InMemoryIndexStorage {
    indexes: DashMap<(Namespace, String), IndexDescriptor>,
}

impl InMemoryIndexStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether data exists for the named index
    pub fn contains(&self, namespace: &Namespace, name: &str) -> bool {
        self.indexes
            .contains_key(&(namespace.clone(), name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

#[async_trait]
impl IndexStorage for InMemoryIndexStorage {
    async fn create_index_data(
        &self,
        namespace: &Namespace,
        descriptor: &IndexDescriptor,
        _background: bool,
    ) -> Result<()> {
        self.indexes.insert(
            (namespace.clone(), descriptor.name.clone()),
            descriptor.clone(),
        );
        Ok(())
    }

    async fn drop_index_data(
        &self,
        namespace: &Namespace,
        descriptor: &IndexDescriptor,
    ) -> Result<()> {
        self.indexes
            .remove(&(namespace.clone(), descriptor.name.clone()));
        Ok(())
    }
}
