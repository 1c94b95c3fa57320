//! On-disk picture of a database the CLI operates on

use anyhow::{Context, Result};
use indexward_catalog::DatabaseState;
use indexward_core::BuildRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Collections with their index descriptors, plus builds still in flight
///
/// ```json
/// {
///   "collections": { "app.users": [ { "name": "_id_", "key": { "_id": 1 } } ] },
///   "builds": [ { "ns": "app.users", "index": { "name": "email_1", "key": { "email": 1 } } } ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(flatten)]
    pub database: DatabaseState,
    #[serde(default)]
    pub builds: Vec<BuildRecord>,
}

impl StateFile {
    /// Read a state file; a missing file is an empty database
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize state")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write state file {}", path.display()))
    }
}
