//! Spec Sync
//!
//! Pulls the specification documents out of the documentation site's script
//! bundle and updates the tracked files. Configuration comes from `SPEC_SYNC_*`
//! environment variables (a `.env` file is honored).

use spec_sync::utils::telemetry::init_tracing;
use spec_sync::{SyncConfig, SyncPipeline};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = SyncConfig::from_env()?;
    let pipeline = SyncPipeline::from_config(&config)?;
    let report = pipeline.run().await?;
    print!("{report}");
    Ok(())
}
