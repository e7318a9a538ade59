pub mod access;
pub mod health;
pub mod issues;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /validate-user          allow-list check, opens a session (public)
///
/// /issues                 list reports (requires session)
/// /submit                 create or edit a report with photos (requires session)
/// /update-issue           edit report fields only (requires session)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(access::router())
        .merge(issues::router())
}
