#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use maintdesk_api::auth::session::{issue_session_token, SessionConfig};
use maintdesk_api::config::ServerConfig;
use maintdesk_api::engine::submission::SubmissionOrchestrator;
use maintdesk_api::router::build_app_router;
use maintdesk_api::state::AppState;
use maintdesk_cloud::{ArchiveConfig, ArchiveError, AssetStore, ImageArchive, ImageUpload};
use maintdesk_core::retry::RetryPolicy;
use maintdesk_core::station::Station;
use maintdesk_events::{ChatMessage, ChatTransport, NotificationDispatcher, NotifyConfig, NotifyError, StationRoutes};
use maintdesk_sheets::memory::MemorySheetStore;
use maintdesk_sheets::models::issue_row::{HEADER, ISSUE_SHEET};
use maintdesk_sheets::repositories::allow_list_repo::USER_SHEET;
use maintdesk_sheets::repositories::{AllowListRepo, IssueRepo};
use maintdesk_sheets::store::Row;

pub const ALLOWED_EMAIL: &str = "tech@example.com";
pub const REGISTER_URL: &str = "https://forms.test/register";
pub const SSW_HOOK: &str = "https://hook.test/ssw";
pub const TPK_HOOK: &str = "https://hook.test/tpk";
pub const ASSET_BASE: &str = "https://assets.test/form_uploads";

// ---------------------------------------------------------------------------
// Fakes at the service seams
// ---------------------------------------------------------------------------

/// Asset store answering with a URL derived from the public id.
#[derive(Default)]
pub struct FakeAssets {
    pub uploaded: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl AssetStore for FakeAssets {
    async fn upload(&self, image: &ImageUpload, public_id: &str) -> Result<String, ArchiveError> {
        self.uploaded
            .lock()
            .unwrap()
            .push((public_id.to_string(), image.file_name.clone()));
        Ok(format!("{ASSET_BASE}/{public_id}.jpg"))
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<(String, ChatMessage)>>,
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send(&self, webhook_url: &str, message: &ChatMessage) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((webhook_url.to_string(), message.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub sheets: Arc<MemorySheetStore>,
    pub assets: Arc<FakeAssets>,
    pub chat: Arc<RecordingTransport>,
    pub config: ServerConfig,
}

impl TestApp {
    /// Every stored row of the issue worksheet, header first.
    pub async fn issue_rows(&self) -> Vec<Row> {
        self.sheets.rows(ISSUE_SHEET).await
    }

    pub fn notifications(&self) -> Vec<(String, ChatMessage)> {
        self.chat.sent.lock().unwrap().clone()
    }

    pub fn token(&self) -> String {
        token_for(ALLOWED_EMAIL, &self.config)
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 5 * 1024 * 1024,
        static_dir: None,
        register_url: Some(REGISTER_URL.to_string()),
        session: SessionConfig {
            secret: "test-session-secret".to_string(),
            expiry_mins: 60,
        },
    }
}

pub fn header_row() -> Row {
    HEADER.iter().map(|c| c.to_string()).collect()
}

/// Build the full router over in-memory fakes. The issue worksheet starts
/// with its header row; the allow-list holds [`ALLOWED_EMAIL`].
pub async fn build_test_app() -> TestApp {
    let config = test_config();
    let retry = RetryPolicy::none();

    let sheets = Arc::new(MemorySheetStore::new());
    sheets.set_sheet(ISSUE_SHEET, vec![header_row()]).await;
    sheets
        .set_sheet(
            USER_SHEET,
            vec![vec!["email".to_string()], vec![ALLOWED_EMAIL.to_string()]],
        )
        .await;

    let assets = Arc::new(FakeAssets::default());
    let chat = Arc::new(RecordingTransport::default());

    let issues = Arc::new(IssueRepo::new(sheets.clone(), retry));
    let allow_list = Arc::new(AllowListRepo::new(sheets.clone(), retry));
    let archive = Arc::new(ImageArchive::new(
        assets.clone(),
        ArchiveConfig::default(),
        retry,
    ));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        NotifyConfig {
            routes: StationRoutes::new(HashMap::from([
                (Station::Ssw, SSW_HOOK.to_string()),
                (Station::Tpk, TPK_HOOK.to_string()),
            ])),
            add_more_case_url: None,
        },
        chat.clone(),
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        issues: issues.clone(),
        allow_list,
        orchestrator: Arc::new(SubmissionOrchestrator::new(archive, issues, dispatcher)),
    };

    TestApp {
        router: build_app_router(state, &config),
        sheets,
        assets,
        chat,
        config,
    }
}

pub fn token_for(email: &str, config: &ServerConfig) -> String {
    issue_session_token(email, &config.session).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_authed(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

/// A file part of a multipart form.
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub bytes: &'a [u8],
}

const BOUNDARY: &str = "maintdesk-test-boundary";

/// Encode text fields and file parts as `multipart/form-data`.
pub fn multipart_body(fields: &[(&str, &str)], files: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for file in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: image/jpeg\r\n\r\n",
                file.field, file.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(
    app: Router,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    files: &[FilePart<'_>],
) -> Response<Body> {
    let request = Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(multipart_body(fields, files)))
        .unwrap();
    send(app, request).await
}

/// A complete report form for `station`.
pub fn report_form(station: &str) -> Vec<(&str, &str)> {
    vec![
        ("station", station),
        ("reportDate", "2026-10-19T14:05"),
        ("reporter", "A. Tan"),
        ("location", "Gate 3"),
        ("issue", "Conveyor stopped"),
        ("rootCause", "Jammed roller"),
        ("repairDetail", "Cleared jam"),
        ("startTime", "14:10"),
        ("endTime", "14:40"),
        ("recoverTime", "14:45"),
        ("classify", "Machine"),
    ]
}
