///
/// This module implements the CLI interface for ai-docs: command parsing,
/// path resolution, and the user-visible report printed after each command.
///
/// All core logic (ledger, extraction, storage, orchestration) lives in the
/// [`ai-docs-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - Command-line users: run the `ai-docs` binary with `--help`.
/// - Programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// ## Paths
/// Every path defaults to a location under `--root`; each one can be
/// overridden on its own (see [`Cli::paths`]).
///
/// [`ai-docs-core`]: ../../ai_docs_core/
use crate::load_config::load_config;
use crate::summarise::OpenAiClient;
use ai_docs_core::config::DocsPaths;
use ai_docs_core::consolidate::consolidate;
use ai_docs_core::manifest;
use ai_docs_core::signatures::JavascriptExtractor;
use ai_docs_core::store::DocsStore;
use ai_docs_core::synchronise::{self, EntryState, SyncError, SynchroniseConfig, SynchroniseReport};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for ai-docs: keep AI-readable summaries of installed packages up to date.
#[derive(Parser, Debug)]
#[clap(
    name = "ai-docs",
    version,
    about = "Summarise a project's npm dependencies into AI-readable JSON docs"
)]
pub struct Cli {
    /// Project root that the default paths are resolved against
    #[clap(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Project manifest [default: <root>/package.json]
    #[clap(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Tool configuration file [default: <root>/ai-docs_config.json]
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output directory for generated docs [default: <root>/ai_docs]
    #[clap(long = "docs-dir", global = true)]
    pub docs_dir: Option<PathBuf>,

    /// Installed packages directory [default: <root>/node_modules]
    #[clap(long = "modules-dir", global = true)]
    pub modules_dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Regenerate docs for every dependency that is new or changed version
    Sync {
        /// Rebuild the consolidated index after processing
        #[clap(long)]
        consolidate: bool,
    },
    /// Rebuild the consolidated index from the docs already on disk
    Consolidate,
    /// List dependencies whose docs are missing or out of date, without processing
    Status,
}

impl Cli {
    /// Resolves the working paths: explicit flags first, then `--root` defaults.
    pub fn paths(&self) -> DocsPaths {
        let defaults = DocsPaths::rooted_at(&self.root);
        DocsPaths {
            manifest_path: self.manifest.clone().unwrap_or(defaults.manifest_path),
            config_path: self.config.clone().unwrap_or(defaults.config_path),
            docs_dir: self.docs_dir.clone().unwrap_or(defaults.docs_dir),
            modules_dir: self.modules_dir.clone().unwrap_or(defaults.modules_dir),
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let paths = cli.paths();
    match cli.command {
        Commands::Sync { consolidate } => {
            tracing::info!(command = "sync", consolidate, "Starting synchronisation");
            // Manifest first: without it nothing else is read.
            manifest::load_dependencies(&paths.manifest_path).map_err(SyncError::from)?;
            let tool_config = load_config(&paths.config_path)?;
            let summariser = OpenAiClient::from_config(&tool_config)
                .context("Failed to construct summarisation client")?;
            let config = SynchroniseConfig {
                paths,
                additional_libraries: tool_config.additional_libraries,
                consolidate,
            };
            let report = synchronise::synchronise(&config, &summariser, &JavascriptExtractor)
                .await
                .map_err(|e| {
                    tracing::error!(command = "sync", error = %e, "Synchronisation aborted");
                    e
                })?;
            print_report(&report);
            tracing::info!(
                command = "sync",
                done = report.succeeded().count(),
                failed = report.failed().count(),
                "Synchronisation complete"
            );
            Ok(())
        }
        Commands::Consolidate => {
            tracing::info!(command = "consolidate", docs_dir = %paths.docs_dir.display(), "Rebuilding consolidated index");
            let store = DocsStore::new(&paths.docs_dir);
            let index = consolidate(&store).context("Failed to build consolidated index")?;
            println!(
                "Consolidated {} libraries into {}",
                index.len(),
                store.consolidated_path().display()
            );
            Ok(())
        }
        Commands::Status => {
            tracing::info!(command = "status", "Computing stale dependencies");
            let outcome = synchronise::status(&paths)?;
            if outcome.stale.is_empty() {
                println!("All dependency docs are up to date");
            }
            for entry in &outcome.stale {
                println!("stale       {}@{}", entry.name, entry.version);
            }
            for name in &outcome.unreadable {
                println!("unreadable  {name}");
            }
            Ok(())
        }
    }
}

fn print_report(report: &SynchroniseReport) {
    if report.entries.is_empty() {
        println!("All dependency docs are up to date");
    }
    for entry in &report.entries {
        match &entry.state {
            EntryState::Done => {
                let note = match &entry.parse_error {
                    Some(e) => format!(" (entry point not parsed: {e})"),
                    None => String::new(),
                };
                println!(
                    "updated     {}@{}: {} functions{note}",
                    entry.name, entry.version, entry.functions
                );
            }
            EntryState::Failed(reason) => {
                println!("failed      {}@{}: {reason}", entry.name, entry.version);
            }
            other => {
                println!("incomplete  {}@{}: {other:?}", entry.name, entry.version);
            }
        }
    }
    for name in &report.unreadable {
        println!("unreadable  {name}: cached summary could not be read, skipped");
    }
    if let Some(count) = report.consolidated {
        println!("Consolidated index rebuilt with {count} libraries");
    }
}
