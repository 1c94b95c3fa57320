//! Registry of running background index builds
//!
//! The registry is an explicit instance shared through `Arc`. It tracks two things
//! per namespace:
//!
//! - running builds, which can be cancelled by criteria and resumed from records;
//! - background structural operations held through [`BackgroundOperation`] guards.
//!
//! Either one makes a namespace off limits for reindex.
//!
//! All calls are synchronous bookkeeping; nothing here waits for a build to finish.

use crate::executor::BuildExecutor;
use crate::filter::BuildFilter;
use dashmap::DashMap;
use indexward_core::{BuildRecord, Error, Namespace, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identifier of one registration of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildId(Uuid);

impl BuildId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct BuildEntry {
    id: BuildId,
    record: BuildRecord,
    cancel: oneshot::Sender<()>,
}

#[derive(Default)]
struct BuildTable {
    builds: DashMap<Namespace, Vec<BuildEntry>>,
    operations: DashMap<Namespace, usize>,
}

impl BuildTable {
    fn remove_build(&self, namespace: &Namespace, id: BuildId) -> bool {
        let removed = match self.builds.get_mut(namespace) {
            Some(mut entries) => {
                let before = entries.len();
                entries.retain(|entry| entry.id != id);
                entries.len() != before
            }
            None => false,
        };
        self.builds.remove_if(namespace, |_, entries| entries.is_empty());
        removed
    }

    fn begin_operation(self: &Arc<Self>, namespace: Namespace) -> BackgroundOperation {
        *self.operations.entry(namespace.clone()).or_insert(0) += 1;
        BackgroundOperation {
            namespace,
            table: Arc::clone(self),
        }
    }
}

/// Holds a namespace as busy with a background structural operation until dropped
pub struct BackgroundOperation {
    namespace: Namespace,
    table: Arc<BuildTable>,
}

impl BackgroundOperation {
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

impl Drop for BackgroundOperation {
    fn drop(&mut self) {
        if let Some(mut count) = self.table.operations.get_mut(&self.namespace) {
            *count = count.saturating_sub(1);
        }
        self.table
            .operations
            .remove_if(&self.namespace, |_, count| *count == 0);
    }
}

/// Cancellation signal of one build
///
/// Fires when the build is killed, or when its registration disappears.
pub struct Cancellation(Option<oneshot::Receiver<()>>);

impl Cancellation {
    /// Resolves once the build is cancelled; never resolves if already taken
    pub async fn cancelled(mut self) {
        match self.0.take() {
            Some(rx) => {
                let _ = rx.await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    pub fn is_cancelled(&mut self) -> bool {
        match &mut self.0 {
            Some(rx) => !matches!(rx.try_recv(), Err(oneshot::error::TryRecvError::Empty)),
            None => false,
        }
    }
}

/// What an executor receives for one launched build
///
/// The handle observes cancellation and lets the task unregister itself on completion.
pub struct BuildHandle {
    id: BuildId,
    record: BuildRecord,
    cancelled: Option<oneshot::Receiver<()>>,
    table: Arc<BuildTable>,
}

impl BuildHandle {
    pub fn id(&self) -> BuildId {
        self.id
    }

    pub fn record(&self) -> &BuildRecord {
        &self.record
    }

    /// Detach the cancellation signal so it can be awaited alongside the build
    pub fn take_cancellation(&mut self) -> Cancellation {
        Cancellation(self.cancelled.take())
    }

    /// Mark the namespace busy while the build is in a phase that cannot be cancelled
    pub fn begin_commit(&self) -> BackgroundOperation {
        self.table.begin_operation(self.record.namespace.clone())
    }

    /// Unregister after the build finished; false if it had already been cancelled
    pub fn complete(self) -> bool {
        self.table.remove_build(&self.record.namespace, self.id)
    }
}

pub struct BackgroundBuildRegistry {
    table: Arc<BuildTable>,
    executor: Arc<dyn BuildExecutor>,
}

impl BackgroundBuildRegistry {
    pub fn new(executor: Arc<dyn BuildExecutor>) -> Self {
        Self {
            table: Arc::new(BuildTable::default()),
            executor,
        }
    }

    /// Register a build and hand it to the executor
    ///
    /// If the executor refuses it, the registration is undone.
    pub fn start(&self, record: BuildRecord) -> Result<BuildId> {
        let id = BuildId::new();
        let (cancel, cancelled) = oneshot::channel();
        let namespace = record.namespace.clone();

        self.table
            .builds
            .entry(namespace.clone())
            .or_default()
            .push(BuildEntry {
                id,
                record: record.clone(),
                cancel,
            });

        let handle = BuildHandle {
            id,
            record,
            cancelled: Some(cancelled),
            table: Arc::clone(&self.table),
        };
        let index = handle.record.index_name().to_string();
        if let Err(e) = self.executor.launch(handle) {
            self.table.remove_build(&namespace, id);
            return Err(e);
        }

        debug!(
            namespace = %namespace,
            index = %index,
            build = %id,
            "Registered background build"
        );
        Ok(id)
    }

    /// Cancel and unregister every build the filter matches
    ///
    /// Records come back in registration order. Matching is destructive: a matched
    /// build is gone from the registry when this returns.
    pub fn kill_matching(&self, filter: &BuildFilter) -> Vec<BuildRecord> {
        let mut killed = Vec::new();
        if let Some(mut entries) = self.table.builds.get_mut(&filter.namespace) {
            let (matched, kept): (Vec<BuildEntry>, Vec<BuildEntry>) = entries
                .drain(..)
                .partition(|entry| filter.matches(&entry.record));
            *entries = kept;

            for entry in matched {
                // The task may already be gone; the send result is irrelevant
                let _ = entry.cancel.send(());
                info!(
                    namespace = %entry.record.namespace,
                    index = %entry.record.index_name(),
                    build = %entry.id,
                    "Cancelled background index build"
                );
                killed.push(entry.record);
            }
        }
        self.table
            .builds
            .remove_if(&filter.namespace, |_, entries| entries.is_empty());
        killed
    }

    /// Re-register and relaunch builds from their records
    ///
    /// Each record is independent; a failure is logged and the rest still resume.
    pub fn resume(&self, records: Vec<BuildRecord>) {
        for record in records {
            let namespace = record.namespace.clone();
            let index = record.index_name().to_string();
            match self.start(record) {
                Ok(id) => info!(
                    namespace = %namespace,
                    index = %index,
                    build = %id,
                    "Resumed background index build"
                ),
                Err(e) => warn!(
                    namespace = %namespace,
                    index = %index,
                    "Failed to resume background index build: {e}"
                ),
            }
        }
    }

    /// Fail if any build is registered for the namespace, or any background structural
    /// operation holds it
    pub fn assert_none_in_progress(&self, namespace: &Namespace) -> Result<()> {
        let building = self
            .table
            .builds
            .get(namespace)
            .map(|entries| !entries.is_empty())
            .unwrap_or(false);
        let busy = self
            .table
            .operations
            .get(namespace)
            .map(|count| *count > 0)
            .unwrap_or(false);
        if building || busy {
            return Err(Error::OperationInProgress(namespace.to_string()));
        }
        Ok(())
    }

    /// Mark a namespace busy until the returned guard is dropped
    pub fn begin_operation(&self, namespace: Namespace) -> BackgroundOperation {
        self.table.begin_operation(namespace)
    }

    /// Records of the builds currently registered for a namespace
    pub fn in_progress(&self, namespace: &Namespace) -> Vec<BuildRecord> {
        self.table
            .builds
            .get(namespace)
            .map(|entries| entries.iter().map(|e| e.record.clone()).collect())
            .unwrap_or_default()
    }

    /// Records of every registered build, grouped by namespace
    pub fn all_in_progress(&self) -> Vec<BuildRecord> {
        let mut namespaces: Vec<Namespace> = self
            .table
            .builds
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        namespaces.sort();
        namespaces
            .iter()
            .flat_map(|ns| self.in_progress(ns))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.builds.iter().map(|entry| entry.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
