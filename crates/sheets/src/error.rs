use maintdesk_core::error::CoreError;
use maintdesk_core::retry::Retryable;
use maintdesk_core::types::ReportId;

/// Errors from the spreadsheet layer.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The Sheets API returned a non-2xx status code.
    #[error("Sheets API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The token endpoint refused the service account assertion.
    #[error("Service account authentication failed: {0}")]
    Credentials(String),

    /// The service account assertion could not be signed.
    #[error("Token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// An A1 range could not be parsed or built.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// No row carries the requested report id.
    #[error("Report {0} not found")]
    ReportNotFound(ReportId),

    /// A domain rule was violated (e.g. a header row was targeted).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl Retryable for SheetsError {
    fn is_retryable(&self) -> bool {
        match self {
            SheetsError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            SheetsError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
