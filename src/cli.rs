//! Command-line interface for midiwatch.
//!
//! One-shot subcommands mirror the host message names (`list-files`,
//! `generate-motifs`, `delete-all-files`, `generate`); `watch` runs the
//! long-lived observation loop.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::commands::{ArtifactAnnouncer, Command, CommandRegistry};
use crate::config::Config;
use crate::dispatch::GenerationRequest;
use crate::outlet::ConsoleOutlet;
use crate::watch::DirectoryWatcher;

/// midiwatch - directory watcher and generation-job dispatcher
#[derive(Parser, Debug)]
#[command(name = "midiwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the nearest midiwatch.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Watched directory, overriding the config file
    #[arg(short, long, env = "MIDIWATCH_DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the generation directory and announce new artifacts
    Watch,

    /// List files in the generation directory
    ListFiles,

    /// Run the fixed motif generator
    GenerateMotifs,

    /// Delete every file in the generation directory
    DeleteAllFiles,

    /// Run the parameterized generator
    Generate {
        /// Seven positional parameters: generations, population, hexagram,
        /// base duration, mutation rate, harmonicity ratio, dynamic ratio
        #[arg(value_name = "PARAM", num_args = 1..)]
        params: Vec<String>,

        /// Print the job outcome as JSON instead of diagnostics
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(dir) = self.dir {
            config.watch_dir = dir;
        }

        let outlet = Arc::new(ConsoleOutlet::new());
        let registry = Arc::new(CommandRegistry::new(config, outlet.clone()));

        match self.command {
            Commands::Watch => watch(registry, outlet).await,
            Commands::ListFiles => {
                registry.handle(Command::ListFiles).await;
                Ok(())
            }
            Commands::GenerateMotifs => {
                registry.handle(Command::GenerateMotifs).await;
                Ok(())
            }
            Commands::DeleteAllFiles => {
                registry.handle(Command::DeleteAllFiles).await;
                Ok(())
            }
            Commands::Generate { params, json } => {
                if json {
                    let request = GenerationRequest::from_args(&params)?;
                    let outcome = registry
                        .dispatcher()
                        .run_parameterized(&request)
                        .await
                        .context("generation job failed to run")?;
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                } else {
                    registry.handle(Command::Generate(params)).await;
                }
                Ok(())
            }
        }
    }
}

/// Run the watcher until Ctrl-C or a fatal watch error.
async fn watch(registry: Arc<CommandRegistry>, outlet: Arc<ConsoleOutlet>) -> Result<()> {
    let mut watcher = DirectoryWatcher::new(registry.config());
    watcher.register(Arc::new(ArtifactAnnouncer::new(registry.clone(), outlet)));

    let mut handle = watcher.start().await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        result = handle.wait() => {
            // Fatal watch error; the subscription is already released.
            result.context("watcher failed")?;
            return Ok(());
        }
    }

    tracing::info!("Shutting down");
    handle.stop().await
}
