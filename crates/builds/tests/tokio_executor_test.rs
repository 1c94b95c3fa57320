// Tests for running builds as tokio tasks

use async_trait::async_trait;
use indexward_builds::{
    BackgroundBuildRegistry, BuildFilter, BuildHandle, CatalogIndexBuilder, IndexBuilder,
    TokioBuildExecutor,
};
use indexward_catalog::{CollectionResolver, Database, InMemoryIndexStorage};
use indexward_core::{BuildRecord, Error, IndexDescriptor, KeyPattern, Namespace, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

fn ns() -> Namespace {
    Namespace::new("shop", "orders").unwrap()
}

fn record(field: &str) -> BuildRecord {
    BuildRecord::new(ns(), IndexDescriptor::new(KeyPattern::new().ascending(field)))
}

async fn wait_until_idle(registry: &BackgroundBuildRegistry) {
    for _ in 0..200 {
        if registry.is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("builds still registered: {:?}", registry.all_in_progress());
}

/// Waits for a signal before finishing
#[derive(Default)]
struct GatedBuilder {
    gate: Notify,
    completed: AtomicUsize,
}

#[async_trait]
impl IndexBuilder for GatedBuilder {
    async fn build(&self, _handle: &BuildHandle) -> Result<()> {
        self.gate.notified().await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingBuilder;

#[async_trait]
impl IndexBuilder for FailingBuilder {
    async fn build(&self, handle: &BuildHandle) -> Result<()> {
        Err(Error::catalog_mutation(format!(
            "cannot build {}",
            handle.record().index_name()
        )))
    }
}

#[tokio::test]
async fn test_catalog_builder_adds_index_and_unregisters() {
    let db = Arc::new(Database::new(Arc::new(InMemoryIndexStorage::new())));
    db.create_collection(ns()).await.unwrap();
    let resolver: Arc<dyn CollectionResolver> = db.clone();
    let registry = BackgroundBuildRegistry::new(Arc::new(TokioBuildExecutor::new(Arc::new(
        CatalogIndexBuilder::new(resolver),
    ))));

    registry.start(record("total")).unwrap();
    wait_until_idle(&registry).await;

    let collection = db.resolve(&ns()).unwrap();
    let catalog = collection.read_catalog().await;
    assert!(catalog.find_by_name("total_1").is_some());
    assert_eq!(catalog.num_indexes_total(), 2);
}

#[tokio::test]
async fn test_cancelled_build_never_completes() {
    let builder = Arc::new(GatedBuilder::default());
    let registry =
        BackgroundBuildRegistry::new(Arc::new(TokioBuildExecutor::new(builder.clone())));

    registry.start(record("total")).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let killed = registry.kill_matching(&BuildFilter::any(ns()));
    assert_eq!(killed, vec![record("total")]);
    builder.gate.notify_waiters();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(builder.completed.load(Ordering::SeqCst), 0);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_finished_build_unregisters() {
    let builder = Arc::new(GatedBuilder::default());
    let registry =
        BackgroundBuildRegistry::new(Arc::new(TokioBuildExecutor::new(builder.clone())));

    registry.start(record("total")).unwrap();
    registry.start(record("placed_at")).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(registry.len(), 2);

    builder.gate.notify_waiters();
    wait_until_idle(&registry).await;
    assert_eq!(builder.completed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_build_unregisters() {
    let registry = BackgroundBuildRegistry::new(Arc::new(TokioBuildExecutor::new(Arc::new(
        FailingBuilder,
    ))));
    registry.start(record("total")).unwrap();
    wait_until_idle(&registry).await;
}

#[test]
fn test_launch_outside_runtime_is_refused() {
    let registry = BackgroundBuildRegistry::new(Arc::new(TokioBuildExecutor::new(Arc::new(
        FailingBuilder,
    ))));
    let err = registry.start(record("total")).unwrap_err();
    assert!(matches!(err, Error::Scheduling(_)));
    assert!(registry.is_empty());
}
