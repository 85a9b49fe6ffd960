//! taskdag CLI binary.

use anyhow::Result;
use taskdag::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the taskdag CLI.
///
/// Uses tokio's current_thread runtime; every command is a short sequence
/// of file reads and writes.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=taskdag=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskdag=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting taskdag CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("taskdag CLI completed successfully");
    Ok(())
}
