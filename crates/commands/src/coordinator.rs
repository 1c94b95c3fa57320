//! Orchestration of `dropIndexes` and `reIndex`
//!
//! Both commands run under the collection's exclusive lock and follow the same
//! shape: cancel the background builds the command would invalidate, then mutate the
//! catalog. They differ in what happens to the cancelled builds:
//!
//! - `dropIndexes` abandons them, since their target index is being dropped;
//! - `reIndex` refuses to start while any build is registered on the namespace, then
//!   sweeps with a wildcard filter to catch builds registered since that check, and
//!   resumes whatever it swept once the foreground rebuild is over, whether or not it
//!   succeeded.
//!
//! A failed rebuild is not rolled back. Whatever the drop step removed stays removed
//! and whatever the recreate loop rebuilt stays rebuilt; the error says how far it got.

use crate::auth::{ActionType, AllowAll, Authorizer};
use crate::oplog::{NoopOperationLog, OperationLog, OplogEntry};
use indexward_builds::{BackgroundBuildRegistry, BuildFilter};
use indexward_catalog::{CollectionResolver, IndexCatalog, Ordinal};
use indexward_core::{
    Config, DropSelector, Error, IndexDescriptor, Namespace, NodeRole, Result,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Message reported when every secondary index was dropped
pub const NON_ID_INDEXES_DROPPED: &str = "non-_id indexes dropped for collection";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropIndexesOutcome {
    pub n_indexes_was: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReIndexOutcome {
    pub n_indexes_was: usize,
    pub n_indexes: usize,
    pub indexes: Vec<IndexDescriptor>,
}

pub struct IndexLifecycleCoordinator {
    resolver: Arc<dyn CollectionResolver>,
    builds: Arc<BackgroundBuildRegistry>,
    authorizer: Arc<dyn Authorizer>,
    oplog: Arc<dyn OperationLog>,
    role: NodeRole,
    quiet: bool,
}

impl IndexLifecycleCoordinator {
    pub fn new(
        resolver: Arc<dyn CollectionResolver>,
        builds: Arc<BackgroundBuildRegistry>,
        config: &Config,
    ) -> Self {
        Self {
            resolver,
            builds,
            authorizer: Arc::new(AllowAll),
            oplog: Arc::new(NoopOperationLog),
            role: config.node.role,
            quiet: config.commands.quiet,
        }
    }

    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    pub fn with_operation_log(mut self, oplog: Arc<dyn OperationLog>) -> Self {
        self.oplog = oplog;
        self
    }

    pub fn builds(&self) -> &Arc<BackgroundBuildRegistry> {
        &self.builds
    }

    /// Drop one index by name or key pattern, or every secondary index
    pub async fn drop_indexes(
        &self,
        namespace: &Namespace,
        selector: &DropSelector,
    ) -> Result<DropIndexesOutcome> {
        self.authorizer.check(namespace, ActionType::DropIndex)?;
        if !self.role.accepts_writes() {
            return Err(Error::NotPrimary);
        }
        if !self.quiet {
            info!("CMD: dropIndexes {namespace}");
        }

        let collection = self
            .resolver
            .resolve(namespace)
            .ok_or_else(|| Error::namespace_not_found(namespace.to_string()))?;
        let mut catalog = collection.write_catalog().await;

        let abandoned = self
            .builds
            .kill_matching(&BuildFilter::for_drop(namespace.clone(), selector));
        if !abandoned.is_empty() {
            debug!(
                namespace = %namespace,
                count = abandoned.len(),
                "Abandoned in-flight builds of dropped indexes"
            );
        }

        let n_indexes_was = catalog.num_indexes_total();
        let msg = match selector {
            DropSelector::All => {
                catalog.drop_all_indexes(false).await?;
                Some(NON_ID_INDEXES_DROPPED.to_string())
            }
            DropSelector::Name(name) => {
                let ordinal = catalog
                    .find_by_name(name)
                    .ok_or_else(|| Error::index_not_found_by_name(name))?;
                drop_secondary(&mut catalog, ordinal).await?;
                None
            }
            DropSelector::KeyPattern(pattern) => {
                let ordinal = catalog
                    .find_by_key_pattern(pattern)
                    .ok_or_else(|| Error::index_not_found_by_key(pattern))?;
                drop_secondary(&mut catalog, ordinal).await?;
                None
            }
        };
        drop(catalog);

        self.oplog
            .append(OplogEntry::drop_indexes(namespace.clone(), selector));
        Ok(DropIndexesOutcome { n_indexes_was, msg })
    }

    /// Rebuild every index of a collection from a snapshot of its descriptors
    ///
    /// Runs on secondaries too and is never written to the operation log.
    pub async fn reindex(&self, namespace: &Namespace) -> Result<ReIndexOutcome> {
        self.authorizer.check(namespace, ActionType::ReIndex)?;
        info!("CMD: reIndex {namespace}");

        let collection = self
            .resolver
            .resolve(namespace)
            .ok_or_else(|| Error::namespace_not_found(namespace.to_string()))?;
        let mut catalog = collection.write_catalog().await;

        self.builds.assert_none_in_progress(namespace)?;
        let swept = self
            .builds
            .kill_matching(&BuildFilter::any(namespace.clone()));

        let result = rebuild(&mut catalog).await;
        drop(catalog);

        if !swept.is_empty() {
            info!(
                namespace = %namespace,
                count = swept.len(),
                "Resuming background builds interrupted by reIndex"
            );
        }
        self.builds.resume(swept);
        result
    }
}

async fn drop_secondary(catalog: &mut IndexCatalog, ordinal: Ordinal) -> Result<()> {
    if catalog.find_identity_index() == Some(ordinal) {
        return Err(Error::IdentityIndexProtected);
    }
    catalog.drop_index(ordinal).await
}

async fn rebuild(catalog: &mut IndexCatalog) -> Result<ReIndexOutcome> {
    let snapshot: Vec<IndexDescriptor> = catalog
        .descriptors()
        .iter()
        .map(IndexDescriptor::without_version)
        .collect();
    let n_indexes_was = catalog.num_indexes_total();

    catalog.drop_all_indexes(true).await?;

    let total = snapshot.len();
    for (recreated, descriptor) in snapshot.iter().enumerate() {
        debug!(
            namespace = %catalog.namespace(),
            index = %descriptor.name,
            key = %descriptor.key_pattern,
            "reIndex recreating index"
        );
        if let Err(e) = catalog.create_index(descriptor.clone(), false).await {
            return Err(Error::RebuildIncomplete {
                recreated,
                total,
                source: Box::new(e),
            });
        }
    }

    Ok(ReIndexOutcome {
        n_indexes_was,
        n_indexes: total,
        indexes: snapshot,
    })
}
