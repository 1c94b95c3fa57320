//! One command run against a state file
//!
//! Builds listed in the state are registered but never executed: they stay in flight
//! until a command cancels them, which is what makes their interaction with
//! `dropIndexes` and `reIndex` observable from the command line.

use crate::state::StateFile;
use anyhow::{Context, Result};
use indexward_builds::{BackgroundBuildRegistry, NoopBuildExecutor};
use indexward_catalog::{CollectionResolver, Database, InMemoryIndexStorage};
use indexward_commands::{CommandDispatcher, IndexLifecycleCoordinator};
use indexward_core::Config;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Reply document plus the state left behind by the command
#[derive(Debug)]
pub struct SessionOutput {
    pub reply: Value,
    pub state: StateFile,
}

pub async fn run_command(
    state: StateFile,
    config: &Config,
    db: &str,
    command: &Value,
) -> Result<SessionOutput> {
    let storage = Arc::new(InMemoryIndexStorage::new());
    let database = Arc::new(
        Database::from_state(state.database, storage)
            .await
            .context("Failed to load collections")?,
    );

    let builds = Arc::new(BackgroundBuildRegistry::new(Arc::new(NoopBuildExecutor)));
    for record in state.builds {
        let id = builds
            .start(record)
            .context("Failed to register in-flight build")?;
        debug!(build = %id, "Registered in-flight build");
    }

    let resolver: Arc<dyn CollectionResolver> = database.clone();
    let coordinator = IndexLifecycleCoordinator::new(resolver, Arc::clone(&builds), config);
    let dispatcher = CommandDispatcher::new(Arc::new(coordinator));
    let reply = dispatcher.run(db, command).await;

    Ok(SessionOutput {
        reply,
        state: StateFile {
            database: database.state().await,
            builds: builds.all_in_progress(),
        },
    })
}
