use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use maintdesk_api::config::ServerConfig;
use maintdesk_api::engine::submission::SubmissionOrchestrator;
use maintdesk_api::router::build_app_router;
use maintdesk_api::state::AppState;
use maintdesk_cloud::cloudinary::{CloudinaryClient, CloudinaryConfig};
use maintdesk_cloud::{ArchiveConfig, ImageArchive};
use maintdesk_core::retry::RetryPolicy;
use maintdesk_events::{DingTalkWebhook, NotificationDispatcher, NotifyConfig};
use maintdesk_sheets::google::{GoogleSheetsClient, SheetsConfig};
use maintdesk_sheets::memory::MemorySheetStore;
use maintdesk_sheets::models::issue_row::{HEADER, ISSUE_SHEET};
use maintdesk_sheets::repositories::allow_list_repo::USER_SHEET;
use maintdesk_sheets::repositories::{AllowListRepo, IssueRepo};
use maintdesk_sheets::SheetHandle;

const DEFAULT_LOG_FILTER: &str = "maintdesk_api=debug,maintdesk_sheets=debug,\
maintdesk_cloud=debug,maintdesk_events=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let retry = RetryPolicy::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        max_attempts = retry.max_attempts,
        "Loaded server configuration",
    );

    // --- Spreadsheet ---
    let sheets = build_sheet_store().await;
    let issues = Arc::new(IssueRepo::new(Arc::clone(&sheets), retry));
    let allow_list = Arc::new(AllowListRepo::new(sheets, retry));

    // --- Image archive ---
    let cloudinary = CloudinaryClient::new(CloudinaryConfig::from_env())
        .expect("Failed to build Cloudinary HTTP client");
    let archive_config = ArchiveConfig::from_env();
    tracing::info!(
        policy = ?archive_config.policy,
        concurrency = archive_config.concurrency,
        "Image archive configured",
    );
    let archive = Arc::new(ImageArchive::new(
        Arc::new(cloudinary),
        archive_config,
        retry,
    ));

    // --- Notifications ---
    let webhook = DingTalkWebhook::new(retry).expect("Failed to build webhook HTTP client");
    let dispatcher = Arc::new(NotificationDispatcher::new(
        NotifyConfig::from_env(),
        Arc::new(webhook),
    ));

    // --- App state ---
    let orchestrator = Arc::new(SubmissionOrchestrator::new(
        archive,
        Arc::clone(&issues),
        dispatcher,
    ));
    let state = AppState {
        config: Arc::new(config.clone()),
        issues,
        allow_list,
        orchestrator,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Google Sheets when `GOOGLE_SHEET_ID` is set, otherwise an in-memory
/// sheet seeded with the header row and `DEV_ALLOWED_EMAILS`.
async fn build_sheet_store() -> SheetHandle {
    if let Some(sheets_config) = SheetsConfig::from_env() {
        tracing::info!(spreadsheet = %sheets_config.spreadsheet_id, "Using Google Sheets");
        let client = GoogleSheetsClient::from_config(&sheets_config)
            .expect("Failed to build Google Sheets client");
        return Arc::new(client);
    }

    tracing::warn!("GOOGLE_SHEET_ID not set; using in-memory sheet, reports will not persist");

    let store = MemorySheetStore::new();
    store
        .set_sheet(ISSUE_SHEET, vec![HEADER.iter().map(|c| c.to_string()).collect()])
        .await;

    let mut users = vec![vec!["email".to_string()]];
    users.extend(
        std::env::var("DEV_ALLOWED_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(|e| vec![e.to_string()]),
    );
    tracing::info!(count = users.len() - 1, "Seeded in-memory allow-list");
    store.set_sheet(USER_SHEET, users).await;

    Arc::new(store)
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
