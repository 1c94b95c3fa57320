//! Operation log hook for replicated mutations

use indexward_core::{DropSelector, Namespace};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Mutex, PoisonError};

/// One replicated command, recorded after it succeeded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OplogEntry {
    #[serde(rename = "ns")]
    pub namespace: Namespace,
    #[serde(rename = "o")]
    pub command: Value,
}

impl OplogEntry {
    pub fn drop_indexes(namespace: Namespace, selector: &DropSelector) -> Self {
        let command = json!({
            "dropIndexes": namespace.collection(),
            "index": selector.to_value(),
        });
        Self { namespace, command }
    }
}

pub trait OperationLog: Send + Sync {
    fn append(&self, entry: OplogEntry);
}

/// Discards entries; for standalone nodes
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationLog;

impl OperationLog for NoopOperationLog {
    fn append(&self, _entry: OplogEntry) {}
}

/// Keeps entries in memory in append order
#[derive(Debug, Default)]
pub struct InMemoryOperationLog {
    entries: Mutex<Vec<OplogEntry>>,
}

impl InMemoryOperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<OplogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OperationLog for InMemoryOperationLog {
    fn append(&self, entry: OplogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}
