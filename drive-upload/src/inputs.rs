//! # Action input loading
//!
//! GitHub exposes each action input as an `INPUT_*` environment variable.
//! This module reads them, applies command-line overrides (useful for local
//! runs), and produces the delivery configuration for the core pipeline.
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::{error, info};

use drive_upload_core::config::DeliveryConfig;

/// Environment variable GitHub sets for the `credentials` input.
pub const CREDENTIALS_VAR: &str = "INPUT_CREDENTIALS";
/// Environment variable GitHub sets for the `folder` input.
pub const FOLDER_VAR: &str = "INPUT_FOLDER";
/// Environment variable GitHub sets for the `target` input.
pub const TARGET_VAR: &str = "INPUT_TARGET";
/// Environment variable GitHub sets for the optional `name` input.
pub const NAME_VAR: &str = "INPUT_NAME";

/// Everything the action needs for one run.
#[derive(Clone)]
pub struct ActionInputs {
    /// Base64-encoded service account JSON document. Never logged.
    pub credentials: String,
    pub folder: String,
    pub target: PathBuf,
    pub name: Option<String>,
}

impl std::fmt::Debug for ActionInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionInputs")
            .field("credentials", &"[censored]")
            .field("folder", &self.folder)
            .field("target", &self.target)
            .field("name", &self.name)
            .finish()
    }
}

impl ActionInputs {
    /// The core pipeline's view of these inputs. Credentials stay out of it.
    pub fn delivery_config(&self) -> DeliveryConfig {
        DeliveryConfig {
            target: self.target.clone(),
            folder_id: self.folder.clone(),
            name: self.name.clone(),
        }
    }
}

/// Values passed on the command line; `None` falls back to the `INPUT_*`
/// environment. Credentials have no override, they only ever arrive through
/// the environment.
#[derive(Debug, Default, Clone)]
pub struct InputOverrides {
    pub target: Option<PathBuf>,
    pub folder: Option<String>,
    pub name: Option<String>,
}

pub fn load_inputs(overrides: &InputOverrides) -> Result<ActionInputs> {
    dotenvy::dotenv().ok(); // loads environment variables from .env if present

    let credentials = required_input("credentials", CREDENTIALS_VAR)?;
    let folder = match &overrides.folder {
        Some(folder) => folder.clone(),
        None => required_input("folder", FOLDER_VAR)?,
    };
    let target = match &overrides.target {
        Some(target) => target.clone(),
        None => PathBuf::from(required_input("target", TARGET_VAR)?),
    };
    let name = overrides
        .name
        .clone()
        .or_else(|| optional_input(NAME_VAR));

    info!(
        folder = %folder,
        target = %target.display(),
        name = ?name,
        credentials_set = !credentials.is_empty(),
        "Loaded action inputs"
    );

    Ok(ActionInputs {
        credentials,
        folder,
        target,
        name,
    })
}

fn required_input(input: &str, var: &str) -> Result<String> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => {
            error!(input, var, "Required action input is empty");
            bail!("required input `{input}` ({var}) is empty");
        }
        Err(_) => {
            error!(input, var, "Required action input is missing");
            bail!("required input `{input}` ({var}) is not set");
        }
    }
}

fn optional_input(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}
