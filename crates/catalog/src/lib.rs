//! Index catalogs and the collections that own them
//!
//! An [`IndexCatalog`] holds the ordered descriptors of one collection. Physical index
//! data is delegated to an [`IndexStorage`] implementation.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod catalog;
mod collection;
pub mod mock;
mod storage;

pub use catalog::{IndexCatalog, Ordinal};
pub use collection::{Collection, CollectionResolver, Database, DatabaseState};
pub use mock::MockIndexStorage;
pub use storage::{InMemoryIndexStorage, IndexStorage};
