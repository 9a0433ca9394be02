use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// What to deliver and where it goes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Local file or directory to upload.
    pub target: PathBuf,
    /// Identifier of the remote folder the artifact is created under.
    pub folder_id: String,
    /// Optional override for the artifact's base name.
    pub name: Option<String>,
}

impl DeliveryConfig {
    pub fn trace_loaded(&self) {
        info!(
            target = %self.target.display(),
            folder_id = %self.folder_id,
            name = ?self.name,
            "Loaded DeliveryConfig"
        );
        debug!(?self, "DeliveryConfig loaded (full debug)");
    }
}
