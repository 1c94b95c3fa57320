// Shared fixtures for coordinator tests
#![allow(dead_code)]

use indexward_builds::{BackgroundBuildRegistry, NoopBuildExecutor};
use indexward_catalog::{CollectionResolver, Database, MockIndexStorage};
use indexward_commands::{InMemoryOperationLog, IndexLifecycleCoordinator};
use indexward_core::{BuildRecord, Config, IndexDescriptor, KeyPattern, Namespace};
use std::sync::Arc;

pub fn ns(collection: &str) -> Namespace {
    Namespace::new("test", collection).expect("valid namespace")
}

pub fn asc(field: &str) -> IndexDescriptor {
    IndexDescriptor::new(KeyPattern::new().ascending(field))
}

pub fn build_of(collection: &str, field: &str) -> BuildRecord {
    BuildRecord::new(ns(collection), asc(field))
}

pub struct Fixture {
    pub storage: Arc<MockIndexStorage>,
    pub db: Arc<Database>,
    pub builds: Arc<BackgroundBuildRegistry>,
    pub oplog: Arc<InMemoryOperationLog>,
    pub coordinator: IndexLifecycleCoordinator,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let storage = Arc::new(MockIndexStorage::new());
        let db = Arc::new(Database::new(storage.clone()));
        let builds = Arc::new(BackgroundBuildRegistry::new(Arc::new(NoopBuildExecutor)));
        let oplog = Arc::new(InMemoryOperationLog::new());
        let resolver: Arc<dyn CollectionResolver> = db.clone();
        let coordinator = IndexLifecycleCoordinator::new(resolver, builds.clone(), &config)
            .with_operation_log(oplog.clone());
        Self {
            storage,
            db,
            builds,
            oplog,
            coordinator,
        }
    }

    /// Create a collection holding the identity index plus the given descriptors
    pub async fn collection(&self, collection: &str, descriptors: Vec<IndexDescriptor>) {
        let coll = self
            .db
            .create_collection(ns(collection))
            .await
            .expect("create collection");
        let mut catalog = coll.write_catalog().await;
        for descriptor in descriptors {
            catalog
                .create_index(descriptor, false)
                .await
                .expect("create index");
        }
    }

    pub async fn descriptors(&self, collection: &str) -> Vec<IndexDescriptor> {
        let coll = self.db.resolve(&ns(collection)).expect("collection exists");
        let catalog = coll.read_catalog().await;
        catalog.descriptors().to_vec()
    }

    pub async fn index_names(&self, collection: &str) -> Vec<String> {
        self.descriptors(collection)
            .await
            .into_iter()
            .map(|d| d.name)
            .collect()
    }

    pub fn start_build(&self, collection: &str, field: &str) {
        self.builds
            .start(build_of(collection, field))
            .expect("start build");
    }
}
