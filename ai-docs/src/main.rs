use ai_docs::cli::{run, Cli};
use ai_docs_core::synchronise::SyncError;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: u8 = 1;
const EXIT_MANIFEST_MISSING: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    tracing::info!("CLI arguments parsed, invoking run");
    match run(cli).await {
        Ok(()) => {
            tracing::info!("CLI completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "CLI exited with error");
            eprintln!("Error: {e:#}");
            let missing_manifest = e
                .downcast_ref::<SyncError>()
                .is_some_and(SyncError::is_manifest_missing);
            if missing_manifest {
                ExitCode::from(EXIT_MANIFEST_MISSING)
            } else {
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }
}
