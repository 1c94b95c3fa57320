//! Privilege checks evaluated before any catalog mutation

use indexward_core::{Error, Namespace, Result};
use std::collections::HashSet;
use std::fmt;

/// Capability a command requires on its namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    DropIndex,
    ReIndex,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DropIndex => write!(f, "dropIndex"),
            Self::ReIndex => write!(f, "reIndex"),
        }
    }
}

pub trait Authorizer: Send + Sync {
    fn check(&self, namespace: &Namespace, action: ActionType) -> Result<()>;
}

/// Grants everything; the default when authorization is handled upstream
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn check(&self, _namespace: &Namespace, _action: ActionType) -> Result<()> {
        Ok(())
    }
}

/// Grants a fixed set of actions on every namespace
#[derive(Debug, Default, Clone)]
pub struct StaticPolicy {
    granted: HashSet<ActionType>,
}

impl StaticPolicy {
    pub fn new(granted: impl IntoIterator<Item = ActionType>) -> Self {
        Self {
            granted: granted.into_iter().collect(),
        }
    }
}

impl Authorizer for StaticPolicy {
    fn check(&self, namespace: &Namespace, action: ActionType) -> Result<()> {
        if self.granted.contains(&action) {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                namespace: namespace.to_string(),
                action: action.to_string(),
            })
        }
    }
}
