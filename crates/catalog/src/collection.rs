//! Collections and the in-memory database that resolves them

use crate::catalog::IndexCatalog;
use crate::storage::IndexStorage;
use dashmap::DashMap;
use indexward_core::{Error, IndexDescriptor, Namespace, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

/// A collection and the exclusive owner of its index catalog
#[derive(Debug)]
pub struct Collection {
    namespace: Namespace,
    catalog: RwLock<IndexCatalog>,
}

impl Collection {
    pub fn new(catalog: IndexCatalog) -> Self {
        Self {
            namespace: catalog.namespace().clone(),
            catalog: RwLock::new(catalog),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Shared access for enumeration
    pub async fn read_catalog(&self) -> RwLockReadGuard<'_, IndexCatalog> {
        self.catalog.read().await
    }

    /// Collection-level exclusive access, required for every catalog mutation
    pub async fn write_catalog(&self) -> RwLockWriteGuard<'_, IndexCatalog> {
        self.catalog.write().await
    }
}

/// Looks up live collections by namespace
pub trait CollectionResolver: Send + Sync {
    fn resolve(&self, namespace: &Namespace) -> Option<Arc<Collection>>;
}

/// Serializable picture of every collection's descriptors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseState {
    pub collections: BTreeMap<Namespace, Vec<IndexDescriptor>>,
}

/// In-memory set of collections sharing one storage engine
pub struct Database {
    storage: Arc<dyn IndexStorage>,
    collections: DashMap<Namespace, Arc<Collection>>,
}

impl Database {
    pub fn new(storage: Arc<dyn IndexStorage>) -> Self {
        Self {
            storage,
            collections: DashMap::new(),
        }
    }

    /// Create a collection with just its identity index
    pub async fn create_collection(&self, namespace: Namespace) -> Result<Arc<Collection>> {
        if self.collections.contains_key(&namespace) {
            return Err(Error::catalog_mutation(format!(
                "collection already exists: {namespace}"
            )));
        }
        let catalog = IndexCatalog::create(namespace.clone(), Arc::clone(&self.storage)).await?;
        let collection = Arc::new(Collection::new(catalog));
        self.collections
            .insert(namespace.clone(), Arc::clone(&collection));
        info!(namespace = %namespace, "Created collection");
        Ok(collection)
    }

    pub fn drop_collection(&self, namespace: &Namespace) -> bool {
        self.collections.remove(namespace).is_some()
    }

    pub fn namespaces(&self) -> Vec<Namespace> {
        let mut names: Vec<Namespace> = self
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Rebuild a database from a saved state, materializing every index in storage
    pub async fn from_state(state: DatabaseState, storage: Arc<dyn IndexStorage>) -> Result<Self> {
        let database = Self::new(Arc::clone(&storage));
        for (namespace, descriptors) in state.collections {
            for descriptor in &descriptors {
                storage
                    .create_index_data(&namespace, descriptor, false)
                    .await?;
            }
            let catalog =
                IndexCatalog::restore(namespace.clone(), Arc::clone(&storage), descriptors)?;
            database
                .collections
                .insert(namespace, Arc::new(Collection::new(catalog)));
        }
        Ok(database)
    }

    /// Capture the current descriptors of every collection
    pub async fn state(&self) -> DatabaseState {
        let collections: Vec<Arc<Collection>> = self
            .collections
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut state = DatabaseState::default();
        for collection in collections {
            let catalog = collection.read_catalog().await;
            state
                .collections
                .insert(collection.namespace().clone(), catalog.descriptors().to_vec());
        }
        state
    }
}

impl CollectionResolver for Database {
    fn resolve(&self, namespace: &Namespace) -> Option<Arc<Collection>> {
        self.collections
            .get(namespace)
            .map(|entry| Arc::clone(entry.value()))
    }
}
