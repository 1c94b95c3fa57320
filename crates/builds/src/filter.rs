//! Criteria used to find running builds
//!
//! The command path has no handles on build tasks, so builds are matched by
//! description: a namespace plus an index name or key pattern.

use indexward_core::{BuildRecord, DropSelector, KeyPattern, Namespace};

/// Which builds on a namespace a filter selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildTarget {
    Any,
    Name(String),
    KeyPattern(KeyPattern),
}

/// Predicate over build records, always scoped to one namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFilter {
    pub namespace: Namespace,
    pub target: BuildTarget,
}

impl BuildFilter {
    /// Every build on the namespace
    pub fn any(namespace: Namespace) -> Self {
        Self {
            namespace,
            target: BuildTarget::Any,
        }
    }

    pub fn by_name(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            target: BuildTarget::Name(name.into()),
        }
    }

    pub fn by_key_pattern(namespace: Namespace, pattern: KeyPattern) -> Self {
        Self {
            namespace,
            target: BuildTarget::KeyPattern(pattern),
        }
    }

    /// Builds that a drop with this selector would make pointless
    pub fn for_drop(namespace: Namespace, selector: &DropSelector) -> Self {
        match selector {
            DropSelector::All => Self::any(namespace),
            DropSelector::Name(name) => Self::by_name(namespace, name.clone()),
            DropSelector::KeyPattern(pattern) => Self::by_key_pattern(namespace, pattern.clone()),
        }
    }

    pub fn matches(&self, record: &BuildRecord) -> bool {
        if record.namespace != self.namespace {
            return false;
        }
        match &self.target {
            BuildTarget::Any => true,
            BuildTarget::Name(name) => &record.descriptor.name == name,
            BuildTarget::KeyPattern(pattern) => &record.descriptor.key_pattern == pattern,
        }
    }
}
