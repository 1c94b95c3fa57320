//! Core types for the indexward index lifecycle system
//!
//! This crate provides the value types shared by every other crate:
//!
//! - **Descriptors**: index metadata (name, key pattern, options)
//! - **Namespaces**: `<db>.<collection>` identifiers
//! - **Selectors**: drop targets supplied by callers
//! - **Build records**: copies of in-flight background builds
//! - **Configuration**: system configuration management
//! - **Error handling**: unified error types
//!

pub mod build;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod namespace;
pub mod selector;

// Re-export main types for convenience
pub use build::BuildRecord;
pub use config::{CommandsConfig, Config, LoggingConfig, NodeConfig, NodeRole};
pub use descriptor::{Direction, IndexDescriptor, KeyPattern, IDENTITY_INDEX_NAME};
pub use error::{Error, Result, ResultExt};
pub use namespace::Namespace;
pub use selector::DropSelector;

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::descriptor::{IndexDescriptor, KeyPattern};
    pub use crate::error::{Result, ResultExt};
    pub use crate::namespace::Namespace;
    pub use crate::selector::DropSelector;
}
