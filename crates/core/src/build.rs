//! Records describing in-flight background index builds

use crate::descriptor::IndexDescriptor;
use crate::namespace::Namespace;
use serde::{Deserialize, Serialize};

/// Copy of one running background build: the namespace and the index being built
///
/// Callers only ever hold copies; the live entry belongs to the build registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    #[serde(rename = "ns")]
    pub namespace: Namespace,
    #[serde(rename = "index")]
    pub descriptor: IndexDescriptor,
}

impl BuildRecord {
    pub fn new(namespace: Namespace, descriptor: IndexDescriptor) -> Self {
        Self {
            namespace,
            descriptor,
        }
    }

    pub fn index_name(&self) -> &str {
        &self.descriptor.name
    }
}
