//! Route definitions for the allow-list check.

use axum::routing::post;
use axum::Router;

use crate::handlers::access;
use crate::state::AppState;

/// Routes merged into `/api`.
///
/// ```text
/// POST /validate-user  -> validate_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/validate-user", post(access::validate_user))
}
