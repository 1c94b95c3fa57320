//! Configuration module for indexward
//!
//! Configuration is loaded from a TOML file with environment variable overrides.
//! Every section is optional; missing values fall back to the defaults below.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.indexward/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".indexward").join("config.toml"))
}

/// Replication role of the node running the commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Primary,
    Secondary,
}

impl NodeRole {
    /// Whether commands that must be replicated may run here
    pub fn accepts_writes(self) -> bool {
        matches!(self, Self::Primary)
    }
}

/// Node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_node_role")]
    pub role: NodeRole,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            role: default_node_role(),
        }
    }
}

/// Command execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Suppress the informational `CMD: dropIndexes` log line
    #[serde(default = "default_quiet")]
    pub quiet: bool,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            quiet: default_quiet(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub node: NodeConfig,

    #[serde(default)]
    pub commands: CommandsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let filter = self.logging.filter.trim();
        if filter.is_empty() {
            return Err(Error::config("logging.filter cannot be empty".to_string()));
        }
        if filter.chars().any(char::is_whitespace) {
            return Err(Error::config(format!(
                "Invalid logging.filter '{filter}': directives must be comma separated without spaces"
            )));
        }
        Ok(())
    }
}
