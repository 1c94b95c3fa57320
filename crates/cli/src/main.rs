//! indexward CLI - index lifecycle commands against a saved database state

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indexward::{run_command, StateFile};
use indexward_core::Config;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "indexward")]
#[command(about = "Drop and rebuild collection indexes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a dropIndexes or reIndex command document
    Exec {
        /// Database state file (created on --write if missing)
        #[arg(long, value_name = "FILE")]
        state: PathBuf,
        /// Database the command is addressed to
        #[arg(long)]
        db: String,
        /// Command document, e.g. '{"dropIndexes": "users", "index": "*"}'
        #[arg(long, value_name = "JSON")]
        command: String,
        /// Save the resulting state back to the state file
        #[arg(long)]
        write: bool,
    },
    /// Print the collections and in-flight builds of a state file
    Show {
        #[arg(long, value_name = "FILE")]
        state: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    init_logging(cli.verbose, &config)?;

    match cli.command {
        Commands::Exec {
            state,
            db,
            command,
            write,
        } => exec(&config, &state, &db, &command, write).await,
        Commands::Show { state } => show(&state),
    }
}

/// Initialize logging system
///
/// `RUST_LOG` wins over the configured filter; `--verbose` wins over both.
fn init_logging(verbose: bool, config: &Config) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.logging.filter))
            .context("Invalid log filter")?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

async fn exec(
    config: &Config,
    state_path: &Path,
    db: &str,
    command: &str,
    write: bool,
) -> Result<()> {
    let document: Value = serde_json::from_str(command).context("Command is not valid JSON")?;
    let state = StateFile::load(state_path)?;

    let output = run_command(state, config, db, &document).await?;
    println!("{}", serde_json::to_string_pretty(&output.reply)?);

    if write {
        output.state.save(state_path)?;
        info!("Saved state to {}", state_path.display());
    }
    Ok(())
}

fn show(state_path: &Path) -> Result<()> {
    let state = StateFile::load(state_path)?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
