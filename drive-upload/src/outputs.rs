//! # Action output publication
//!
//! GitHub collects action outputs from the file named by `GITHUB_OUTPUT`:
//! every `name=value` line appended there becomes an output of the step. The
//! `link` output published here carries the shareable folder URL.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Environment variable naming the file GitHub collects outputs from.
pub const GITHUB_OUTPUT_VAR: &str = "GITHUB_OUTPUT";
/// The single output this action publishes.
pub const LINK_OUTPUT: &str = "link";

/// Appends `name=value` to the workflow's output file. Outside a workflow
/// (no `GITHUB_OUTPUT` set) the value is logged and publication is skipped,
/// so local runs behave like CI minus the side effect.
pub fn publish_output(name: &str, value: &str) -> Result<()> {
    let path = match env::var_os(GITHUB_OUTPUT_VAR) {
        Some(path) => path,
        None => {
            warn!(name, value, "GITHUB_OUTPUT is not set; skipping output publication");
            return Ok(());
        }
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| {
            format!(
                "failed to open workflow output file {}",
                Path::new(&path).display()
            )
        })?;
    writeln!(file, "{name}={value}").context("failed to append to workflow output file")?;
    info!(name, value, "Published action output");
    Ok(())
}
