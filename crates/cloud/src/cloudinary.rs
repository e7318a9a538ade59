//! Cloudinary upload client.
//!
//! Uploads are signed server-side: the request parameters are sorted,
//! joined as `key=value` pairs, suffixed with the API secret and hashed with
//! SHA-256. The secret itself never leaves the process.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::ArchiveError;
use crate::store::{AssetStore, ImageUpload};

/// Default Cloudinary API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Folder namespace all report images are uploaded under.
pub const DEFAULT_FOLDER: &str = "form_uploads";

/// Content type for files whose declared type does not parse.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// HTTP timeout for a single upload.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub api_base: String,
}

impl CloudinaryConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default        |
    /// |--------------------------|----------|----------------|
    /// | `CLOUDINARY_CLOUD_NAME`  | yes      |                |
    /// | `CLOUDINARY_API_KEY`     | yes      |                |
    /// | `CLOUDINARY_API_SECRET`  | yes      |                |
    /// | `CLOUDINARY_FOLDER`      | no       | `form_uploads` |
    ///
    /// # Panics
    ///
    /// Panics if any required variable is missing.
    pub fn from_env() -> Self {
        Self {
            cloud_name: std::env::var("CLOUDINARY_CLOUD_NAME")
                .expect("CLOUDINARY_CLOUD_NAME must be set"),
            api_key: std::env::var("CLOUDINARY_API_KEY").expect("CLOUDINARY_API_KEY must be set"),
            api_secret: std::env::var("CLOUDINARY_API_SECRET")
                .expect("CLOUDINARY_API_SECRET must be set"),
            folder: std::env::var("CLOUDINARY_FOLDER")
                .unwrap_or_else(|_| DEFAULT_FOLDER.to_string()),
            api_base: std::env::var("CLOUDINARY_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct CloudinaryClient {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self, ArchiveError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: CloudinaryConfig) -> Self {
        Self { client, config }
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Map a non-2xx response to [`ArchiveError::Api`], preferring the
    /// message Cloudinary puts in its JSON error body.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ArchiveError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(ArchiveError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AssetStore for CloudinaryClient {
    async fn upload(&self, image: &ImageUpload, public_id: &str) -> Result<String, ArchiveError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("folder", self.config.folder.as_str()),
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let form = Form::new()
            .part("file", file_part(image)?)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("public_id", public_id.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = Self::ensure_success(response).await?.json().await?;

        tracing::debug!(public_id, url = %body.secure_url, bytes = image.bytes.len(), "Image uploaded");
        Ok(body.secure_url)
    }
}

/// Multipart file part for `image`. A content type the client sent that is
/// not a valid MIME type is replaced with `application/octet-stream`.
fn file_part(image: &ImageUpload) -> Result<Part, ArchiveError> {
    let part = || Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
    let Some(content_type) = image.content_type.as_deref() else {
        return Ok(part());
    };
    match part().mime_str(content_type) {
        Ok(part) => Ok(part),
        Err(e) => {
            tracing::warn!(content_type, file = %image.file_name, error = %e, "Unusable content type, sending as binary");
            Ok(part().mime_str(FALLBACK_CONTENT_TYPE)?)
        }
    }
}

/// Cloudinary request signature: SHA-256 hex of the sorted, non-empty
/// `key=value` pairs joined by `&`, followed by the API secret.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut pairs: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    let joined = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let hash = Sha256::digest(format!("{joined}{api_secret}").as_bytes());
    format!("{hash:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_known_digest() {
        let signature = sign_params(
            &[
                ("timestamp", "1315060510"),
                ("public_id", "abc-1"),
                ("folder", "form_uploads"),
            ],
            "abcd",
        );
        assert_eq!(
            signature,
            "9b966d862b9386b568086f40ea8acd166ff4e174f7772ea85551fa637b55a813"
        );
    }

    #[test]
    fn empty_params_are_not_signed() {
        let with_empty = sign_params(&[("folder", ""), ("timestamp", "1")], "s");
        let without = sign_params(&[("timestamp", "1")], "s");
        assert_eq!(with_empty, without);
    }

    #[test]
    fn upload_url_is_per_cloud() {
        let client = CloudinaryClient::with_client(
            reqwest::Client::new(),
            CloudinaryConfig {
                cloud_name: "demo".into(),
                api_key: "k".into(),
                api_secret: "s".into(),
                folder: DEFAULT_FOLDER.into(),
                api_base: "https://api.cloudinary.com/v1_1/".into(),
            },
        );
        assert_eq!(
            client.upload_url(),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }
}
