//! The authoritative set of index descriptors for one collection
//!
//! Every mutation goes through `&mut self`; the owning [`crate::Collection`] keeps the
//! catalog behind a write lock, so two mutations on one catalog never interleave and
//! readers only ever see a catalog between calls.
//!
//! Each individual mutation is atomic: the storage engine is asked first and the
//! descriptor list only changes once it agrees. Compound operations such as
//! [`IndexCatalog::drop_all_indexes`] are a sequence of such steps and may stop
//! partway.

use crate::storage::IndexStorage;
use indexward_core::{Error, IndexDescriptor, KeyPattern, Namespace, Result};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Position of a descriptor in its catalog; renumbered after every drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ordinal(usize);

impl Ordinal {
    pub fn new(position: usize) -> Self {
        Self(position)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub struct IndexCatalog {
    namespace: Namespace,
    storage: Arc<dyn IndexStorage>,
    entries: Vec<IndexDescriptor>,
}

impl fmt::Debug for IndexCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexCatalog")
            .field("namespace", &self.namespace)
            .field("entries", &self.entries)
            .finish()
    }
}

impl IndexCatalog {
    /// Create the catalog for a new collection, building its identity index
    pub async fn create(namespace: Namespace, storage: Arc<dyn IndexStorage>) -> Result<Self> {
        let mut catalog = Self {
            namespace,
            storage,
            entries: Vec::new(),
        };
        catalog
            .create_index(IndexDescriptor::identity(), false)
            .await?;
        Ok(catalog)
    }

    /// Re-attach descriptors whose index data already exists in storage
    ///
    /// The list must have unique names and contain the identity index.
    pub fn restore(
        namespace: Namespace,
        storage: Arc<dyn IndexStorage>,
        descriptors: Vec<IndexDescriptor>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            if !seen.insert(descriptor.name.as_str()) {
                return Err(Error::IndexAlreadyExists(descriptor.name.clone()));
            }
        }
        if !descriptors.iter().any(IndexDescriptor::is_identity) {
            return Err(Error::catalog_mutation(format!(
                "catalog for {namespace} has no _id index"
            )));
        }
        Ok(Self {
            namespace,
            storage,
            entries: descriptors,
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn num_indexes_total(&self) -> usize {
        self.entries.len()
    }

    pub fn descriptors(&self) -> &[IndexDescriptor] {
        &self.entries
    }

    pub fn get(&self, ordinal: Ordinal) -> Option<&IndexDescriptor> {
        self.entries.get(ordinal.get())
    }

    pub fn find_by_name(&self, name: &str) -> Option<Ordinal> {
        self.entries
            .iter()
            .position(|d| d.name == name)
            .map(Ordinal)
    }

    pub fn find_by_key_pattern(&self, pattern: &KeyPattern) -> Option<Ordinal> {
        self.entries
            .iter()
            .position(|d| &d.key_pattern == pattern)
            .map(Ordinal)
    }

    /// Only absent while a reindex has dropped everything and not yet rebuilt it
    pub fn find_identity_index(&self) -> Option<Ordinal> {
        self.entries
            .iter()
            .position(IndexDescriptor::is_identity)
            .map(Ordinal)
    }

    /// Drop one secondary index
    pub async fn drop_index(&mut self, ordinal: Ordinal) -> Result<()> {
        let descriptor = self
            .entries
            .get(ordinal.get())
            .ok_or_else(|| Error::IndexNotFound(format!("no index at ordinal {ordinal}")))?;
        if descriptor.is_identity() {
            return Err(Error::IdentityIndexProtected);
        }
        self.remove_at(ordinal).await
    }

    /// Drop every secondary index, and the identity index too when asked
    ///
    /// Dropping the identity index is only legal as part of a rebuild that recreates it
    /// straight after. On failure the indexes dropped so far stay dropped.
    pub async fn drop_all_indexes(&mut self, include_identity: bool) -> Result<()> {
        let mut targets: Vec<String> = self
            .entries
            .iter()
            .filter(|d| !d.is_identity())
            .map(|d| d.name.clone())
            .collect();
        if include_identity {
            if let Some(ordinal) = self.find_identity_index() {
                targets.push(self.entries[ordinal.get()].name.clone());
            }
        }

        for name in targets {
            if let Some(ordinal) = self.find_by_name(&name) {
                self.remove_at(ordinal).await?;
            }
        }

        debug!(
            namespace = %self.namespace,
            remaining = self.entries.len(),
            include_identity,
            "Dropped all indexes"
        );
        Ok(())
    }

    /// Append a new index; names must be unique within the catalog
    pub async fn create_index(
        &mut self,
        descriptor: IndexDescriptor,
        background: bool,
    ) -> Result<()> {
        if self.find_by_name(&descriptor.name).is_some() {
            return Err(Error::IndexAlreadyExists(descriptor.name));
        }
        self.storage
            .create_index_data(&self.namespace, &descriptor, background)
            .await?;
        debug!(
            namespace = %self.namespace,
            index = %descriptor.name,
            background,
            "Created index"
        );
        self.entries.push(descriptor);
        Ok(())
    }

    async fn remove_at(&mut self, ordinal: Ordinal) -> Result<()> {
        let descriptor = &self.entries[ordinal.get()];
        self.storage
            .drop_index_data(&self.namespace, descriptor)
            .await?;
        let removed = self.entries.remove(ordinal.get());
        debug!(namespace = %self.namespace, index = %removed.name, "Dropped index");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockIndexStorage;
    use pretty_assertions::assert_eq;

    fn ns() -> Namespace {
        Namespace::new("test", "people").unwrap()
    }

    fn names(catalog: &IndexCatalog) -> Vec<&str> {
        catalog
            .descriptors()
            .iter()
            .map(|d| d.name.as_str())
            .collect()
    }

    async fn catalog_with(storage: Arc<MockIndexStorage>, fields: &[&str]) -> IndexCatalog {
        let mut catalog = IndexCatalog::create(ns(), storage).await.unwrap();
        for field in fields {
            catalog
                .create_index(IndexDescriptor::new(KeyPattern::new().ascending(*field)), false)
                .await
                .unwrap();
        }
        catalog
    }

    #[tokio::test]
    async fn test_create_starts_with_identity() {
        let catalog = IndexCatalog::create(ns(), Arc::new(MockIndexStorage::new()))
            .await
            .unwrap();
        assert_eq!(catalog.num_indexes_total(), 1);
        assert_eq!(catalog.find_identity_index(), Some(Ordinal::new(0)));
    }

    #[tokio::test]
    async fn test_find_by_name_and_key_pattern() {
        let catalog = catalog_with(Arc::new(MockIndexStorage::new()), &["name", "age"]).await;
        assert_eq!(catalog.find_by_name("age_1"), Some(Ordinal::new(2)));
        assert_eq!(
            catalog.find_by_key_pattern(&KeyPattern::new().ascending("name")),
            Some(Ordinal::new(1))
        );
        assert_eq!(catalog.find_by_name("missing"), None);
        assert_eq!(
            catalog.find_by_key_pattern(&KeyPattern::new().descending("name")),
            None
        );
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let mut catalog = catalog_with(Arc::new(MockIndexStorage::new()), &["name"]).await;
        let err = catalog
            .create_index(IndexDescriptor::new(KeyPattern::new().ascending("name")), true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IndexAlreadyExists(ref n) if n == "name_1"));
        assert_eq!(catalog.num_indexes_total(), 2);
    }

    #[tokio::test]
    async fn test_drop_index_renumbers() {
        let mut catalog = catalog_with(Arc::new(MockIndexStorage::new()), &["a", "b", "c"]).await;
        catalog.drop_index(Ordinal::new(1)).await.unwrap();
        assert_eq!(names(&catalog), vec!["_id_", "b_1", "c_1"]);
        assert_eq!(catalog.find_by_name("c_1"), Some(Ordinal::new(2)));
    }

    #[tokio::test]
    async fn test_drop_index_refuses_identity_and_unknown() {
        let mut catalog = catalog_with(Arc::new(MockIndexStorage::new()), &["a"]).await;
        let err = catalog.drop_index(Ordinal::new(0)).await.unwrap_err();
        assert!(matches!(err, Error::IdentityIndexProtected));
        let err = catalog.drop_index(Ordinal::new(7)).await.unwrap_err();
        assert!(matches!(err, Error::IndexNotFound(_)));
        assert_eq!(catalog.num_indexes_total(), 2);
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_catalog_unchanged() {
        let storage = Arc::new(MockIndexStorage::new());
        let mut catalog = catalog_with(storage.clone(), &["a"]).await;
        storage.fail_drop_of("a_1");
        storage.fail_create_of("b_1");

        assert!(catalog.drop_index(Ordinal::new(1)).await.is_err());
        assert!(catalog
            .create_index(IndexDescriptor::new(KeyPattern::new().ascending("b")), false)
            .await
            .is_err());
        assert_eq!(names(&catalog), vec!["_id_", "a_1"]);
    }

    #[tokio::test]
    async fn test_drop_all_keeps_identity() {
        let storage = Arc::new(MockIndexStorage::new());
        let mut catalog = catalog_with(storage.clone(), &["a", "b"]).await;
        catalog.drop_all_indexes(false).await.unwrap();
        assert_eq!(names(&catalog), vec!["_id_"]);
        assert!(storage.contains(&ns(), "_id_"));
        assert!(!storage.contains(&ns(), "a_1"));
    }

    #[tokio::test]
    async fn test_drop_all_including_identity_empties_catalog() {
        let mut catalog = catalog_with(Arc::new(MockIndexStorage::new()), &["a"]).await;
        catalog.drop_all_indexes(true).await.unwrap();
        assert_eq!(catalog.num_indexes_total(), 0);
        assert_eq!(catalog.find_identity_index(), None);

        catalog
            .create_index(IndexDescriptor::identity(), false)
            .await
            .unwrap();
        assert_eq!(catalog.find_identity_index(), Some(Ordinal::new(0)));
    }

    #[tokio::test]
    async fn test_drop_all_stops_at_first_failure() {
        let storage = Arc::new(MockIndexStorage::new());
        let mut catalog = catalog_with(storage.clone(), &["a", "b", "c"]).await;
        storage.fail_drop_of("b_1");

        let err = catalog.drop_all_indexes(true).await.unwrap_err();
        assert!(matches!(err, Error::CatalogMutationFailed(_)));
        assert_eq!(names(&catalog), vec!["_id_", "b_1", "c_1"]);
    }

    #[tokio::test]
    async fn test_restore_validates_descriptors() {
        let storage: Arc<dyn IndexStorage> = Arc::new(MockIndexStorage::new());
        let a = IndexDescriptor::new(KeyPattern::new().ascending("a"));

        let restored = IndexCatalog::restore(
            ns(),
            storage.clone(),
            vec![IndexDescriptor::identity(), a.clone()],
        )
        .unwrap();
        assert_eq!(restored.num_indexes_total(), 2);

        let dup = IndexCatalog::restore(
            ns(),
            storage.clone(),
            vec![IndexDescriptor::identity(), a.clone(), a.clone()],
        );
        assert!(matches!(dup, Err(Error::IndexAlreadyExists(_))));

        let no_identity = IndexCatalog::restore(ns(), storage, vec![a]);
        assert!(no_identity.is_err());
    }
}
