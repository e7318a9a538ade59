use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use maintdesk_core::error::CoreError;
use maintdesk_sheets::SheetsError;
use serde_json::json;

use crate::engine::submission::SubmissionError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors, the spreadsheet and submission
/// errors of the downstream crates, and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `maintdesk_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A spreadsheet error outside the submission pipeline.
    #[error(transparent)]
    Sheets(#[from] SheetsError),

    /// A failed submission; the client only learns that it failed.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Generic 500 triple. The detail goes to the log only.
fn internal(detail: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Sheets(SheetsError::ReportNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Report with id {id} not found"),
            ),
            AppError::Sheets(SheetsError::Core(core)) => classify_core_error(core),
            AppError::Sheets(err) => internal(err),

            // Upload, sheet and notification failures look the same to the
            // client; the log carries the stage.
            AppError::Submission(err) => internal(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
