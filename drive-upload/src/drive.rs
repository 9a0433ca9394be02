#![doc = "Drive integration for CLI and core: bridges the RemoteStore trait to the Google Drive v3 API for real uploads."]
//
//! # Drive Client (CLI <-> Core)
//!
//! This module provides the bridge between the CLI workflow and the storage
//! abstraction in [`drive_upload_core::contract`]. It wires up the
//! [`RemoteStore`] trait for real use against the Google Drive v3 API, and
//! provides the `DriveClient` used by the CLI for networked uploads.
//!
//! ## Client Usage
//!
//! - Construct [`DriveClient`] with decoded service account credentials via
//!   [`DriveClient::connect`]; the OAuth2 token exchange happens there.
//! - Uploads use the v3 `multipart/related` upload: one JSON metadata part
//!   naming the file and its parent folder, one media part with the bytes.
//! - All transport, serialization, and error handling are encapsulated in the
//!   client implementation.

use std::env;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error, info};
use uuid::Uuid;

use drive_upload_core::contract::{
    NewRemoteFile, PermissionList, RemoteFile, RemoteStore, StoreError,
};

use crate::credentials::{self, ServiceAccountKey};

/// Production Google API host. Upload and metadata requests share it.
pub const DRIVE_ENDPOINT: &str = "https://www.googleapis.com";
/// Environment override for the API host; integration tests point this at a
/// local server.
pub const ENDPOINT_VAR: &str = "DRIVE_API_ENDPOINT";

pub struct DriveClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl std::fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveClient")
            .field("http", &self.http)
            .field("endpoint", &self.endpoint)
            .field("token", &"[censored]")
            .finish()
    }
}

impl DriveClient {
    /// Connects against the endpoint from the environment (or the production
    /// default), exchanging the service account key for an access token.
    pub async fn connect(key: ServiceAccountKey) -> Result<Self> {
        Self::connect_to(key, endpoint_from_env()).await
    }

    /// Connects against a specific API host.
    pub async fn connect_to(key: ServiceAccountKey, endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::new();
        let token = credentials::fetch_access_token(&http, &key).await?;
        let endpoint = endpoint.into();
        info!(endpoint = %endpoint, "Drive client connected");
        Ok(DriveClient {
            http,
            endpoint,
            token,
        })
    }
}

/// The API host to talk to: `DRIVE_API_ENDPOINT` if set, production otherwise.
pub fn endpoint_from_env() -> String {
    env::var(ENDPOINT_VAR).unwrap_or_else(|_| DRIVE_ENDPOINT.to_string())
}

/// Assembles a `multipart/related` body: JSON metadata part first, then the
/// media part, separated by the given boundary (RFC 2387 framing).
fn multipart_related_body(boundary: &str, metadata: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + metadata.len() + 256);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/octet-stream\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[async_trait]
impl RemoteStore for DriveClient {
    async fn create_file<'a>(&self, req: NewRemoteFile<'a>) -> Result<RemoteFile, StoreError> {
        info!(
            file = %req.source_path.display(),
            display_name = req.display_name,
            parent_folder_id = req.parent_folder_id,
            "Uploading file to Google Drive"
        );

        let content = tokio::fs::read(req.source_path).await.map_err(|e| {
            error!(file = %req.source_path.display(), error = %e, "Failed to read upload source");
            StoreError::from(format!("failed to read {}: {e}", req.source_path.display()))
        })?;

        let metadata = serde_json::json!({
            "name": req.display_name,
            "parents": [req.parent_folder_id],
        })
        .to_string();

        let boundary = format!("drive-upload-{}", Uuid::new_v4());
        let body = multipart_related_body(&boundary, &metadata, &content);
        debug!(
            bytes = body.len(),
            boundary = %boundary,
            "Assembled multipart upload body"
        );

        let response = self
            .http
            .post(format!("{}/upload/drive/v3/files", self.endpoint))
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .bearer_auth(&self.token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to decode response body>"));
            error!(%status, body = %body, "Drive upload request rejected");
            return Err(format!("Drive upload failed with status {status}: {body}").into());
        }

        let file: RemoteFile = response.json().await?;
        info!(file_id = %file.id, "Drive reported the uploaded file");
        Ok(file)
    }

    async fn list_permissions(&self, file_id: &str) -> Result<PermissionList, StoreError> {
        info!(file_id, "Listing permissions on uploaded Drive file");
        let response = self
            .http
            .get(format!(
                "{}/drive/v3/files/{file_id}/permissions",
                self.endpoint
            ))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to decode response body>"));
            error!(%status, file_id, "Drive permissions listing rejected");
            return Err(
                format!("Drive permissions listing failed with status {status}: {body}").into(),
            );
        }

        let list: PermissionList = response.json().await?;
        debug!(
            file_id,
            count = list.permissions.len(),
            "Fetched permissions listing"
        );
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::multipart_related_body;

    #[test]
    fn multipart_body_frames_metadata_then_media() {
        let body = multipart_related_body("b42", r#"{"name":"a"}"#, b"BYTES");
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with(
            "--b42\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{\"name\":\"a\"}\r\n"
        ));
        assert!(text.contains("--b42\r\nContent-Type: application/octet-stream\r\n\r\nBYTES"));
        assert!(text.ends_with("\r\n--b42--\r\n"));
    }

    #[test]
    fn multipart_body_keeps_binary_media_intact() {
        let media = [0u8, 159, 146, 150, 13, 10];
        let body = multipart_related_body("edge", "{}", &media);
        let media_start = body
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|at| at + 4)
            .unwrap();
        let tail = &body[media_start..];
        assert!(tail
            .windows(media.len())
            .any(|window| window == media));
    }
}
