//! Handlers for listing and editing stored reports.

use axum::extract::State;
use axum::Json;
use maintdesk_core::report::{IssueReport, ReportFields};
use maintdesk_core::types::{ReportId, RowIndex};
use maintdesk_sheets::repositories::RowTarget;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/update-issue`: the identifier of the report
/// plus its complete field set.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssueRequest {
    /// Row number, sent by the edit form as a number or a string.
    #[serde(default)]
    pub row_index: Option<serde_json::Value>,
    #[serde(default)]
    pub report_id: Option<ReportId>,
    #[serde(flatten)]
    pub fields: ReportFields,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl UpdateIssueRequest {
    /// The report to overwrite. A report id wins over a row number.
    pub fn target(&self) -> AppResult<RowTarget> {
        if let Some(id) = self.report_id {
            return Ok(RowTarget::Id(id));
        }
        let row = match &self.row_index {
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => return Err(AppError::BadRequest("Missing rowIndex".into())),
        };
        Ok(RowTarget::Row(row.parse::<RowIndex>()?))
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/issues
///
/// Every stored report with its row number, in sheet order.
pub async fn list_issues(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<IssueReport>>> {
    let reports = state.issues.list_all().await?;
    tracing::debug!(email = %user.email, count = reports.len(), "Listed reports");
    Ok(Json(reports))
}

/// POST /api/update-issue
///
/// Overwrite the contract columns of one report. Images are left alone and
/// no notification is sent.
pub async fn update_issue(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateIssueRequest>,
) -> AppResult<Json<MessageResponse>> {
    let target = input.target()?;
    let mut fields = input.fields;
    fields.email = user.email;

    let row = state.issues.update_fields(target, &fields).await?;
    tracing::info!(email = %fields.email, row = %row, "Report edited");

    Ok(Json(MessageResponse {
        message: "Row updated successfully",
    }))
}
