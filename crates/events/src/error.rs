use maintdesk_core::retry::Retryable;
use maintdesk_core::station::Station;

/// DingTalk's "sending too fast" error code.
const ERRCODE_RATE_LIMITED: i64 = 130101;

/// Error type for notification failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The report names a station outside the known set.
    #[error("No webhook configured for station: {0}")]
    UnknownStation(String),

    /// The station is known but no webhook URL is configured for it.
    #[error("Missing webhook URL for station: {0}")]
    MissingWebhook(Station),

    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),

    /// The chat service accepted the request but refused the message.
    #[error("Webhook rejected message (errcode {errcode}): {errmsg}")]
    Rejected { errcode: i64, errmsg: String },
}

impl Retryable for NotifyError {
    fn is_retryable(&self) -> bool {
        match self {
            NotifyError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            NotifyError::HttpStatus(status) => *status == 429 || *status >= 500,
            NotifyError::Rejected { errcode, .. } => *errcode == ERRCODE_RATE_LIMITED,
            NotifyError::UnknownStation(_) | NotifyError::MissingWebhook(_) => false,
        }
    }
}
