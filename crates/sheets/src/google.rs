//! Google Sheets v4 REST client.
//!
//! Implements [`SheetStore`] on top of the `spreadsheets.values` endpoints.
//! Values are written with `USER_ENTERED` semantics so the sheet parses
//! dates and numbers the same way it would for a human typing them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::auth::{ServiceAccountTokens, TokenSource, DEFAULT_TOKEN_URL};
use crate::error::SheetsError;
use crate::store::{Row, SheetStore};

/// Default Sheets API base URL.
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// HTTP timeout for a single Sheets request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Connection settings for the Sheets API.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub service_account_email: String,
    pub private_key: String,
    pub api_base: String,
    pub token_url: String,
}

impl SheetsConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `GOOGLE_SHEET_ID` is not set, signalling that the
    /// in-memory store should be used instead.
    ///
    /// | Variable                              | Required         |
    /// |---------------------------------------|------------------|
    /// | `GOOGLE_SHEET_ID`                     | no               |
    /// | `GOOGLE_SERVICE_ACCOUNT_EMAIL`        | with a sheet id  |
    /// | `GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY`  | with a sheet id  |
    ///
    /// # Panics
    ///
    /// Panics if a sheet id is set without service account credentials.
    pub fn from_env() -> Option<Self> {
        let spreadsheet_id = std::env::var("GOOGLE_SHEET_ID")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self {
            spreadsheet_id,
            service_account_email: std::env::var("GOOGLE_SERVICE_ACCOUNT_EMAIL")
                .expect("GOOGLE_SERVICE_ACCOUNT_EMAIL must be set when GOOGLE_SHEET_ID is set"),
            private_key: std::env::var("GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY").expect(
                "GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY must be set when GOOGLE_SHEET_ID is set",
            ),
            api_base: std::env::var("GOOGLE_SHEETS_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            token_url: std::env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: AppendUpdates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client bound to one spreadsheet.
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    tokens: Arc<dyn TokenSource>,
}

impl GoogleSheetsClient {
    /// Build a client that authenticates as the configured service account.
    pub fn from_config(config: &SheetsConfig) -> Result<Self, SheetsError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let tokens = ServiceAccountTokens::new(
            client.clone(),
            config.service_account_email.clone(),
            &config.private_key,
            config.token_url.clone(),
        )?;
        Ok(Self::with_tokens(
            client,
            config.api_base.clone(),
            config.spreadsheet_id.clone(),
            Arc::new(tokens),
        ))
    }

    /// Build a client around an existing [`reqwest::Client`] and token source.
    pub fn with_tokens(
        client: reqwest::Client,
        api_base: String,
        spreadsheet_id: String,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            client,
            api_base,
            spreadsheet_id,
            tokens,
        }
    }

    /// `{api_base}/{spreadsheet_id}/values/{tail}` with each part encoded as
    /// a path segment.
    fn values_url(&self, tail: &str) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| SheetsError::InvalidRange(format!("bad API base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidRange("API base cannot be a base URL".into()))?
            .pop_if_empty()
            .extend([self.spreadsheet_id.as_str(), "values", tail]);
        Ok(url)
    }

    /// Return the response unchanged on success, or an
    /// [`SheetsError::Api`] carrying the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn get_values(&self, range: &str) -> Result<Vec<Row>, SheetsError> {
        let url = self.values_url(range)?;
        let token = self.tokens.access_token().await?;

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let body: ValueRange = Self::ensure_success(response).await?.json().await?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn append_row(&self, range: &str, row: Row) -> Result<String, SheetsError> {
        let mut url = self.values_url(&format!("{range}:append"))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": [row] }))
            .send()
            .await?;
        let body: AppendResponse = Self::ensure_success(response).await?.json().await?;

        tracing::debug!(updated_range = %body.updates.updated_range, "Row appended");
        Ok(body.updates.updated_range)
    }

    async fn update_row(&self, range: &str, row: Row) -> Result<(), SheetsError> {
        let mut url = self.values_url(range)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [row],
            }))
            .send()
            .await?;
        Self::ensure_success(response).await?;

        tracing::debug!(range, "Row updated");
        Ok(())
    }
}

/// Render a cell as the text the sheet shows.
fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
