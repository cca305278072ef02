//! ndtable CLI binary.

use anyhow::Result;
use ndtable::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the ndtable CLI.
///
/// Uses tokio's current_thread runtime: a scan is a single sequential
/// stream of reads.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSONL.
    // Example: RUST_LOG=ndtable=debug,ndtable_jsonl=trace ndtable data.jsonl
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ndtable=info,ndtable_jsonl=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting ndtable CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("ndtable CLI completed successfully");
    Ok(())
}
