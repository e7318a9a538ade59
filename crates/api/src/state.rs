use std::sync::Arc;

use maintdesk_sheets::repositories::{AllowListRepo, IssueRepo};

use crate::config::ServerConfig;
use crate::engine::submission::SubmissionOrchestrator;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Issue reports in the spreadsheet.
    pub issues: Arc<IssueRepo>,
    /// Allow-listed submitter addresses.
    pub allow_list: Arc<AllowListRepo>,
    pub orchestrator: Arc<SubmissionOrchestrator>,
}
