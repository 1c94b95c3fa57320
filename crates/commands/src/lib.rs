//! Index lifecycle commands: `dropIndexes` and `reIndex`
//!
//! The [`IndexLifecycleCoordinator`] combines background build cancellation with
//! catalog mutation. [`CommandDispatcher`] exposes it through command documents.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod auth;
mod coordinator;
pub mod dispatch;
pub mod oplog;

pub use auth::{ActionType, AllowAll, Authorizer, StaticPolicy};
pub use coordinator::{
    DropIndexesOutcome, IndexLifecycleCoordinator, ReIndexOutcome, NON_ID_INDEXES_DROPPED,
};
pub use dispatch::{CommandDispatcher, IndexCommand};
pub use oplog::{InMemoryOperationLog, NoopOperationLog, OperationLog, OplogEntry};
