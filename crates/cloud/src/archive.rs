//! Fan-out upload of the images attached to one report.
//!
//! Uploads run concurrently up to a fixed bound and their URLs are collected
//! in completion order, not input order. What happens when some uploads fail
//! is decided by [`UploadPolicy`].

use std::str::FromStr;

use futures::stream::{self, StreamExt};
use maintdesk_core::error::CoreError;
use maintdesk_core::retry::RetryPolicy;
use maintdesk_core::types::ReportId;

use crate::error::ArchiveError;
use crate::store::{AssetHandle, ImageUpload};

/// Default number of uploads in flight per request.
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 4;

/// How a batch reacts to individual upload failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadPolicy {
    /// The first failure fails the batch; uploads still in flight are dropped.
    #[default]
    AllOrNothing,
    /// Failed uploads are logged and left out of the result.
    BestEffort,
}

impl FromStr for UploadPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_or_nothing" => Ok(UploadPolicy::AllOrNothing),
            "best_effort" => Ok(UploadPolicy::BestEffort),
            other => Err(CoreError::Validation(format!(
                "Unknown upload policy '{other}' (expected all_or_nothing or best_effort)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveConfig {
    pub policy: UploadPolicy,
    /// Upper bound on concurrent uploads. Never less than 1.
    pub concurrency: usize,
}

impl ArchiveConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var              | Default          |
    /// |----------------------|------------------|
    /// | `UPLOAD_POLICY`      | `all_or_nothing` |
    /// | `UPLOAD_CONCURRENCY` | `4`              |
    ///
    /// # Panics
    ///
    /// Panics if `UPLOAD_POLICY` names an unknown policy.
    pub fn from_env() -> Self {
        let policy = std::env::var("UPLOAD_POLICY")
            .ok()
            .map(|v| v.parse().expect("UPLOAD_POLICY must be all_or_nothing or best_effort"))
            .unwrap_or_default();
        let concurrency = std::env::var("UPLOAD_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_UPLOAD_CONCURRENCY);
        Self {
            policy,
            concurrency: concurrency.max(1),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            policy: UploadPolicy::default(),
            concurrency: DEFAULT_UPLOAD_CONCURRENCY,
        }
    }
}

pub struct ImageArchive {
    store: AssetHandle,
    config: ArchiveConfig,
    retry: RetryPolicy,
}

impl ImageArchive {
    pub fn new(store: AssetHandle, config: ArchiveConfig, retry: RetryPolicy) -> Self {
        Self {
            store,
            config,
            retry,
        }
    }

    /// Upload `files` under the batch `batch_id` and return their URLs in
    /// completion order.
    ///
    /// The n-th file (1-based) is stored as `<batch_id>-<n>`, so a retried
    /// upload overwrites rather than duplicates. No files means no contact
    /// with the store at all.
    pub async fn archive(
        &self,
        batch_id: ReportId,
        files: Vec<ImageUpload>,
    ) -> Result<Vec<String>, ArchiveError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let total = files.len();

        let mut uploads = stream::iter(files.into_iter().enumerate().map(|(i, file)| {
            let public_id = format!("{batch_id}-{}", i + 1);
            async move {
                let result = self
                    .retry
                    .run("cloud.upload", |_| self.store.upload(&file, &public_id))
                    .await;
                (public_id, result)
            }
        }))
        .buffer_unordered(self.config.concurrency.max(1));

        let mut urls = Vec::with_capacity(total);
        while let Some((public_id, result)) = uploads.next().await {
            match result {
                Ok(url) => urls.push(url),
                Err(e) if self.config.policy == UploadPolicy::AllOrNothing => {
                    tracing::error!(%batch_id, %public_id, error = %e, "Image upload failed, aborting batch");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(%batch_id, %public_id, error = %e, "Image upload failed, dropping image");
                }
            }
        }

        tracing::info!(%batch_id, uploaded = urls.len(), total, "Images archived");
        Ok(urls)
    }
}
