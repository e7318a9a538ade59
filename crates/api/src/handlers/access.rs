//! Handler for the allow-list check that opens a session.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::session::issue_session_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /api/validate-user`.
#[derive(Debug, Deserialize)]
pub struct ValidateUserRequest {
    #[serde(default)]
    pub email: String,
}

/// Response for `POST /api/validate-user`.
///
/// `ok: true` carries a session token; `ok: false` carries the registration
/// link when one is configured.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateUserResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_url: Option<String>,
}

/// POST /api/validate-user
///
/// An address that is not allow-listed is an answer, not an error.
pub async fn validate_user(
    State(state): State<AppState>,
    Json(input): Json<ValidateUserRequest>,
) -> AppResult<Json<ValidateUserResponse>> {
    if !state.allow_list.contains(&input.email).await? {
        tracing::info!(email = %input.email, "Address not on allow-list");
        return Ok(Json(ValidateUserResponse {
            ok: false,
            token: None,
            expires_in: None,
            register_url: state.config.register_url.clone(),
        }));
    }

    let token = issue_session_token(&input.email, &state.config.session)
        .map_err(|e| AppError::InternalError(format!("Session token signing failed: {e}")))?;

    tracing::info!(email = %input.email, "Session opened");
    Ok(Json(ValidateUserResponse {
        ok: true,
        token: Some(token),
        expires_in: Some(state.config.session.expires_in_secs()),
        register_url: None,
    }))
}
