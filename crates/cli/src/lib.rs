//! Library interface for the indexward CLI
//!
//! Exposes the state file format and the command session for integration testing
//! while keeping argument handling in main.rs.

pub mod session;
pub mod state;

pub use session::{run_command, SessionOutput};
pub use state::StateFile;
