///
/// This module implements the full CLI interface for drive-upload—handling
/// command parsing, argument validation, the main entrypoint, and user-visible
/// invocations.
///
/// All core business logic (archiving, the delivery pipeline, contracts) lives
/// in the [`drive-upload-core`] crate. This module is strictly for CLI glue,
/// ergonomic argument exposure, and orchestration.
///
/// ## Features
/// - Entry struct [`Cli`] defines all user-facing options and subcommands (see below).
/// - Subcommand routing (e.g., `upload`) and argument validation.
/// - Async entrypoint (`run`) for programmatic invocation and integration testing.
/// - Logging, tracing, and structured error output at CLI level.
///
/// ## How To Use
/// - In a workflow: the action container runs `drive-upload upload`, reading
///   the `INPUT_*` environment GitHub provides.
/// - For local runs: pass `--target`, `--folder` and `--name` to override the
///   environment, with `INPUT_CREDENTIALS` still supplying the key.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// ## Extending
/// When adding features or subcommands, update [`Commands`] below
/// and keep all non-trivial business logic inside `drive-upload-core`.
///
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use drive_upload_core::deliver::deliver;

use crate::credentials::decode_service_account;
use crate::drive::DriveClient;
use crate::inputs::{self, InputOverrides};
use crate::outputs;

/// CLI for drive-upload: archive a target and publish it to Google Drive.
#[derive(Parser)]
#[clap(
    name = "drive-upload",
    version,
    about = "Upload a file or zipped folder to a Google Drive folder and publish its link"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload the configured target to the configured Drive folder
    Upload {
        /// Local file or directory to upload (overrides INPUT_TARGET)
        #[clap(long)]
        target: Option<PathBuf>,
        /// Destination Drive folder id (overrides INPUT_FOLDER)
        #[clap(long)]
        folder: Option<String>,
        /// Base name for the uploaded artifact (overrides INPUT_NAME)
        #[clap(long)]
        name: Option<String>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let result = match cli.command {
        Commands::Upload {
            target,
            folder,
            name,
        } => {
            tracing::info!(command = "upload", "Starting upload process");
            let overrides = InputOverrides {
                target,
                folder,
                name,
            };
            let inputs = inputs::load_inputs(&overrides)?;
            let config = inputs.delivery_config();
            config.trace_loaded();

            let key = decode_service_account(&inputs.credentials)?;
            let store = DriveClient::connect(key).await?;

            match deliver(&config, &store).await {
                Ok(report) => {
                    tracing::info!(
                        command = "upload",
                        file_id = %report.file_id,
                        display_name = %report.display_name,
                        link = %report.link,
                        "Delivery complete"
                    );
                    outputs::publish_output(outputs::LINK_OUTPUT, &report.link)?;
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "upload", error = %e, "Delivery failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    };

    result
}
