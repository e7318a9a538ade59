use maintdesk_core::retry::Retryable;

/// Errors from the asset store layer.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The asset store rejected the upload.
    #[error("Asset store error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl Retryable for ArchiveError {
    fn is_retryable(&self) -> bool {
        match self {
            ArchiveError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            // Cloudinary answers 420 when a rate limit is hit.
            ArchiveError::Api { status, .. } => matches!(*status, 420 | 429) || *status >= 500,
        }
    }
}
