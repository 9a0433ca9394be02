//! High-level pipeline: orchestrates archive → upload → permissions audit.
//!
//! This module provides the top-level orchestration logic for delivering one
//! configured target to a remote folder. It implements a coordinated pipeline
//! that:
//!   - Zips the target first when it is a directory (plain files upload as-is)
//!   - Uploads the resulting file to the configured remote folder via [`RemoteStore`]
//!   - Lists the uploaded file's permissions afterwards so runs record who can
//!     see the artifact
//!   - Returns a report with the remote file id and the shareable folder link.
//!
//! # Major Types
//! - [`DeliveryConfig`]: Bundles target, folder and naming for a "run"
//! - [`DeliveryReport`]: Output report for downstream publication/audit
//!
//! # Error Handling
//! Each failed step (target lookup, zip, upload) returns immediately with a
//! typed error; callers should log and surface these to users/test logs. The
//! permissions listing is the one tolerated failure: the artifact is already
//! delivered by then, so a listing error is logged and the run still succeeds.
//!
//! # Callable From
//! - Used by both the CLI crate and integration tests
//! - Expects a concrete (async) [`RemoteStore`] implementation for uploads

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::archive::{self, ArchiveSummary};
use crate::config::DeliveryConfig;
use crate::contract::{NewRemoteFile, RemoteStore, StoreError};

/// Base URL shared by every folder link the pipeline publishes.
pub const FOLDER_LINK_BASE: &str = "https://drive.google.com/drive/folders";

/// Final report of a successful delivery.
#[derive(Debug)]
pub struct DeliveryReport {
    /// Store-assigned id of the uploaded file.
    pub file_id: String,
    /// Name the remote store displays for the file.
    pub display_name: String,
    /// Shareable link to the destination folder.
    pub link: String,
    /// Present when the target was a directory and got zipped first.
    pub archive: Option<ArchiveSummary>,
}

#[derive(Debug)]
pub enum DeliveryError {
    /// The configured target could not be read at all.
    Target {
        path: PathBuf,
        source: std::io::Error,
    },
    Archive(archive::ArchiveError),
    Upload(StoreError),
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryError::Target { path, source } => {
                write!(f, "cannot read target {}: {source}", path.display())
            }
            DeliveryError::Archive(e) => write!(f, "zip failed: {e}"),
            DeliveryError::Upload(e) => write!(f, "upload failed: {e}"),
        }
    }
}

impl std::error::Error for DeliveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeliveryError::Target { source, .. } => Some(source),
            DeliveryError::Archive(e) => Some(e),
            DeliveryError::Upload(e) => Some(e.as_ref()),
        }
    }
}

/// Web link to the destination folder. The uploaded file has no direct link
/// of its own in the report; it is reachable through the folder.
pub fn folder_link(folder_id: &str) -> String {
    format!("{FOLDER_LINK_BASE}/{folder_id}")
}

/// Local path the archive for a directory target is written to: the name
/// override if set, otherwise the target path itself, with `.zip` appended.
pub fn archive_path(config: &DeliveryConfig) -> PathBuf {
    match &config.name {
        Some(name) => PathBuf::from(format!("{name}.zip")),
        None => PathBuf::from(format!("{}.zip", config.target.display())),
    }
}

/// The name the remote store shows: the path's final segment.
fn file_display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub async fn deliver<S>(config: &DeliveryConfig, store: &S) -> Result<DeliveryReport, DeliveryError>
where
    S: RemoteStore + Sync,
{
    info!(
        target = %config.target.display(),
        folder_id = %config.folder_id,
        "Starting delivery pipeline"
    );

    let metadata = match tokio::fs::metadata(&config.target).await {
        Ok(metadata) => metadata,
        Err(e) => {
            error!(target = %config.target.display(), error = %e, "Target is missing or unreadable");
            return Err(DeliveryError::Target {
                path: config.target.clone(),
                source: e,
            });
        }
    };

    // --- Step 1: Archive directory targets; plain files upload as-is. ---
    let (upload_path, display_name, archive) = if metadata.is_dir() {
        info!(target = %config.target.display(), "Folder detected, zipping it before upload");
        let out = archive_path(config);
        let summary = match archive::zip_directory(&config.target, &out) {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Zip failed");
                return Err(DeliveryError::Archive(e));
            }
        };
        let display_name = file_display_name(&out);
        (out, display_name, Some(summary))
    } else {
        let display_name = match &config.name {
            Some(name) => name.clone(),
            None => file_display_name(&config.target),
        };
        (config.target.clone(), display_name, None)
    };

    // --- Step 2: Upload the file to the remote folder. ---
    info!(
        file = %upload_path.display(),
        display_name = %display_name,
        "Uploading artifact to remote folder"
    );
    let request = NewRemoteFile {
        source_path: &upload_path,
        display_name: &display_name,
        parent_folder_id: &config.folder_id,
    };
    let created = match store.create_file(request).await {
        Ok(file) => {
            info!(file_id = %file.id, "File uploaded successfully");
            file
        }
        Err(e) => {
            error!(error = %e, "Upload failed");
            return Err(DeliveryError::Upload(e));
        }
    };

    // --- Step 3: Permissions audit. ---
    // Strictly after the upload so the listing always refers to the file just
    // created. The artifact is already delivered at this point, so a listing
    // failure is logged and tolerated instead of failing the run.
    match store.list_permissions(&created.id).await {
        Ok(permissions) => {
            let json = serde_json::to_string(&permissions)
                .unwrap_or_else(|e| format!("<failed to serialise permissions: {e}>"));
            info!(file_id = %created.id, permissions = %json, "Permissions for uploaded file");
        }
        Err(e) => {
            warn!(file_id = %created.id, error = %e, "Permissions listing failed after upload");
        }
    }

    Ok(DeliveryReport {
        file_id: created.id,
        display_name,
        link: folder_link(&config.folder_id),
        archive,
    })
}
