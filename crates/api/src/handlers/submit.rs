//! Handler for report creation and edits with photos.

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;
use maintdesk_cloud::ImageUpload;
use maintdesk_core::report::ReportFields;
use maintdesk_core::types::{ReportId, RowIndex};
use maintdesk_sheets::repositories::RowTarget;
use serde::Serialize;

use crate::engine::submission::Submission;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Form field names carrying image files.
const PICTURE_FIELDS: [&str; 2] = ["pictures", "pictures[]"];

/// Response for `POST /api/submit`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub ok: bool,
    pub report_id: ReportId,
    pub row_index: RowIndex,
}

/// POST /api/submit
///
/// Multipart body: the report fields, optional `rowIndex` or `reportId`
/// (either marks an edit), and any number of `pictures` files.
pub async fn submit(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<SubmitResponse>> {
    let mut submission = parse_submission(multipart).await?;
    submission.fields.email = user.email;

    let outcome = state.orchestrator.submit(submission).await?;

    Ok(Json(SubmitResponse {
        ok: true,
        report_id: outcome.report_id,
        row_index: outcome.row_index,
    }))
}

/// Split a multipart body into report fields, edit target and image files.
///
/// Empty file parts (a file input left blank) are skipped. Unknown text
/// fields are ignored.
pub async fn parse_submission(mut multipart: Multipart) -> AppResult<Submission> {
    let mut fields = ReportFields::default();
    let mut row_index: Option<RowIndex> = None;
    let mut report_id: Option<ReportId> = None;
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();

        if PICTURE_FIELDS.contains(&name.as_str()) {
            if let Some(image) = read_image(field).await? {
                images.push(image);
            }
            continue;
        }

        let value = field.text().await.map_err(bad_multipart)?;
        match name.as_str() {
            "rowIndex" if !value.trim().is_empty() => row_index = Some(value.parse()?),
            "reportId" if !value.trim().is_empty() => report_id = Some(value.trim().parse()?),
            "rowIndex" | "reportId" => {}
            _ => {
                if !fields.set(&name, value) {
                    tracing::debug!(field = %name, "Ignoring unknown form field");
                }
            }
        }
    }

    let target = match (report_id, row_index) {
        (Some(id), _) => Some(RowTarget::Id(id)),
        (None, Some(row)) => Some(RowTarget::Row(row)),
        (None, None) => None,
    };

    Ok(Submission {
        fields,
        target,
        images,
    })
}

async fn read_image(field: Field<'_>) -> AppResult<Option<ImageUpload>> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(bad_multipart)?;

    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(ImageUpload {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    }))
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
}
