//! Route definitions for issue reports.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{issues, submit};
use crate::state::AppState;

/// Routes merged into `/api`.
///
/// ```text
/// GET  /issues        -> list_issues
/// POST /submit        -> submit (multipart)
/// POST /update-issue  -> update_issue (JSON)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/issues", get(issues::list_issues))
        .route("/submit", post(submit::submit))
        .route("/update-issue", post(issues::update_issue))
}
