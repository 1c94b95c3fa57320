//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;
use tracing::debug;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `INDEXWARD_` and use double underscores
    /// for nested values. For example:
    /// - `INDEXWARD_NODE__ROLE=secondary`
    /// - `INDEXWARD_COMMANDS__QUIET=true`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // The config crate doesn't apply serde defaults for missing sections
        let builder = set_config_default(builder, "node.role", DEFAULT_NODE_ROLE)?;
        let builder = set_config_default(builder, "commands.quiet", default_quiet())?;
        let mut builder = set_config_default(builder, "logging.filter", default_log_filter())?;

        if path.exists() {
            debug!(path = %path.display(), "Loading config file");
            builder = builder.add_source(File::from(path));
        } else {
            debug!(path = %path.display(), "Config file not found, using defaults");
        }

        builder = builder.add_source(
            Environment::with_prefix("INDEXWARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.indexward/config.toml or custom --config path)
    /// 3. Environment variables (INDEXWARD_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
