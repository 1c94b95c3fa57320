//! Background index build tracking
//!
//! The [`BackgroundBuildRegistry`] knows which index builds are running on which
//! namespace. Builds are cancelled by criteria ([`BuildFilter`]) rather than by handle,
//! and can be resumed later from the records returned by a cancellation.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod executor;
mod filter;
mod registry;

pub use executor::{
    BuildExecutor, CatalogIndexBuilder, IndexBuilder, NoopBuildExecutor, TokioBuildExecutor,
};
pub use filter::{BuildFilter, BuildTarget};
pub use registry::{
    BackgroundBuildRegistry, BackgroundOperation, BuildHandle, BuildId, Cancellation,
};
