//! # contract: Universal interface for remote artifact storage
//!
//! This module defines a single trait (`RemoteStore`) and concrete supporting
//! types for creating files in a remote folder (e.g. a Google Drive folder)
//! and inspecting the permissions attached to them, via an external API or a
//! mock/test implementation.
//!
//! ## Interface & Extensibility
//! - Implement the [`RemoteStore`] trait to create new storage clients (e.g. API, file-based).
//! - All methods are async, returning results and using boxed error types.
//! - Error handling is uniform: all API/caller errors return boxed trait objects.
//! - Meant for both production code and robust mocking in tests.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so consumers can generate deterministic mocks for unit/integration tests.

use async_trait::async_trait;

use mockall::{automock, predicate::*};

/// Represents the bare minimum data needed to create a file in the remote store.
#[derive(Debug, Clone)]
pub struct NewRemoteFile<'a> {
    /// Local file whose bytes become the remote file's content.
    pub source_path: &'a std::path::Path,
    /// Name the remote store displays for the file.
    pub display_name: &'a str,
    /// Identifier of the remote folder the file is created under.
    pub parent_folder_id: &'a str,
}

/// Represents the created file, as reported back by the remote store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RemoteFile {
    /// Store-assigned identifier of the new file.
    pub id: String,
}

/// A single permission entry attached to a remote file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Permission {
    pub id: String,
    /// Grantee class: `user`, `group`, `domain` or `anyone`.
    #[serde(rename = "type")]
    pub grantee_type: String,
    pub role: String,
}

/// The permissions listing for a remote file. Logged verbatim after an
/// upload so workflow runs record who can see the artifact.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PermissionList {
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Error type for RemoteStore trait (simple boxed error for now)
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for storing artifacts in a remote folder and reading them back.
/// The implementor is responsible for connecting to a backing service or
/// storage API.
///
/// The trait is implemented by real clients and by test mocks, and is
/// intended for async/await usage.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create a new file under a remote folder from a local file's contents.
    ///
    /// Implementor is responsible for content handling and required API fields.
    async fn create_file<'a>(&self, req: NewRemoteFile<'a>) -> Result<RemoteFile, StoreError>;

    /// List the permissions attached to a remote file by its ID.
    async fn list_permissions(&self, file_id: &str) -> Result<PermissionList, StoreError>;
}
