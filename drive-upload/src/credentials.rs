//! # Service account credentials and token exchange
//!
//! The action receives a base64-encoded Google service account JSON document
//! in its `credentials` input. This module decodes it and performs the OAuth2
//! JWT-bearer exchange that turns the account's RSA key into a short-lived
//! bearer token for the Drive API.
//!
//! The private key never leaves this module: logging the decoded key prints
//! `[censored]`, and exactly one signing operation happens per run.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Scope requested for the access token: full Drive access, needed to create
/// files inside arbitrary folders shared with the service account.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
/// Default token endpoint, used when the credential document carries none.
pub const OAUTH2_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Assertion lifetime. Google caps service account assertions at one hour.
const TOKEN_LIFETIME_SECS: u64 = 3600;
/// Issued-at is backdated by this much so small clock skews at the token
/// server do not reject an otherwise valid assertion.
const CLOCK_SKEW_FUDGE_SECS: u64 = 10;

/// The fields of a service account JSON document this action needs. Extra
/// fields in the document (project id, client id, cert URLs) are ignored.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[censored]")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// The endpoint assertions are sent to, falling back to Google's default.
    pub fn token_endpoint(&self) -> String {
        self.token_uri
            .clone()
            .unwrap_or_else(|| OAUTH2_TOKEN_ENDPOINT.to_string())
    }
}

/// Decodes the base64-encoded JSON credential document the action receives.
pub fn decode_service_account(encoded: &str) -> Result<ServiceAccountKey> {
    // A default `base64` invocation line-wraps its output; the wrapping
    // whitespace is not part of the document.
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let raw = BASE64_STANDARD
        .decode(compact)
        .context("credentials input is not valid base64")?;
    let key: ServiceAccountKey = serde_json::from_slice(&raw)
        .context("credentials input does not decode to a service account JSON document")?;
    info!(client_email = %key.client_email, "Decoded service account credentials");
    Ok(key)
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

/// RS256-signed JWT asserting the service account's identity towards `aud`.
pub fn signed_assertion(key: &ServiceAccountKey, aud: &str, now: SystemTime) -> Result<String> {
    let now_secs = now
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")?
        .as_secs();
    let iat = now_secs.saturating_sub(CLOCK_SKEW_FUDGE_SECS);
    let exp = iat + TOKEN_LIFETIME_SECS;

    let claims = AssertionClaims {
        iss: &key.client_email,
        sub: &key.client_email,
        scope: DRIVE_SCOPE,
        aud,
        iat,
        exp,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .context("service account private_key is not a usable RSA PEM key")?;
    encode(&header, &claims, &signing_key).context("failed to sign the token assertion")
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Exchanges a signed assertion for a bearer access token. One exchange per
/// run; the hour-long token comfortably outlives the upload.
pub async fn fetch_access_token(http: &reqwest::Client, key: &ServiceAccountKey) -> Result<String> {
    let token_endpoint = key.token_endpoint();
    let assertion = signed_assertion(key, &token_endpoint, SystemTime::now())?;

    info!(client_email = %key.client_email, "Requesting Drive access token");
    let response = http
        .post(&token_endpoint)
        .form(&[
            ("grant_type", JWT_BEARER_GRANT_TYPE),
            ("assertion", assertion.as_str()),
        ])
        .send()
        .await
        .context("token endpoint request failed")?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<failed to decode response body>"));
        error!(%status, "Token exchange rejected");
        bail!("token exchange failed with status {status}: {body}");
    }

    let token: TokenResponse = response
        .json()
        .await
        .context("token endpoint returned malformed JSON")?;
    info!(
        token_type = ?token.token_type,
        expires_in = ?token.expires_in,
        "Obtained Drive access token"
    );
    Ok(token.access_token)
}
