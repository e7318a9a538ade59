//! Session-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use maintdesk_core::error::CoreError;

use crate::auth::session::validate_session_token;
use crate::error::AppError;
use crate::state::AppState;

/// Allow-listed submitter behind the `Authorization: Bearer` session token.
///
/// The token only proves the address passed the allow-list once; the
/// address is checked again on every request so removing it from the sheet
/// takes effect immediately.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(email = %user.email, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = validate_session_token(token, &state.config.session)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        if !state.allow_list.contains(&claims.sub).await? {
            tracing::warn!(email = %claims.sub, jti = %claims.jti, "Session for address no longer allow-listed");
            return Err(AppError::Core(CoreError::Forbidden(
                "Email is no longer authorized".into(),
            )));
        }

        Ok(AuthUser { email: claims.sub })
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;
    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}
