use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ArchiveError;

/// One image file received with a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name as sent by the browser.
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A hosted store for report images.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store `image` under `public_id` and return its durable HTTPS URL.
    ///
    /// Uploading the same `public_id` twice replaces the earlier asset, so
    /// repeating a failed upload never leaves duplicates behind.
    async fn upload(&self, image: &ImageUpload, public_id: &str) -> Result<String, ArchiveError>;
}

/// Shared handle to the configured asset store.
pub type AssetHandle = Arc<dyn AssetStore>;
