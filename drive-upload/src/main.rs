use anyhow::Result;
use clap::Parser;
use drive_upload::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment
    dotenv::dotenv().ok();

    // Initialize tracing for the CLI.
    tracing_subscriber::fmt::init();
    tracing::info!("drive-upload startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    tracing::info!("CLI arguments parsed, invoking run");
    let result = run(cli).await;
    match &result {
        Ok(_) => tracing::info!("drive-upload completed successfully"),
        Err(e) => tracing::error!(error = %e, "drive-upload exited with error"),
    }
    result
}
