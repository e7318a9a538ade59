//! OAuth2 access tokens for the Sheets API.
//!
//! [`ServiceAccountTokens`] implements the service-account flow: an RS256
//! JWT assertion signed with the account's private key is exchanged for a
//! short-lived bearer token, which is cached until shortly before expiry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::SheetsError;

/// OAuth scope for read/write spreadsheet access.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Default Google OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Lifetime requested for each assertion (the maximum Google accepts).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh cached tokens this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens for outgoing Sheets requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, SheetsError>;
}

/// A fixed token, for local proxies and tests.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, SheetsError> {
        Ok(self.0.clone())
    }
}

/// JWT claims of a service-account assertion.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(service_account_email: &str, token_url: &str, now: i64) -> Self {
        Self {
            iss: service_account_email.to_string(),
            scope: SHEETS_SCOPE.to_string(),
            aud: token_url.to_string(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Service-account token exchange with caching.
pub struct ServiceAccountTokens {
    client: reqwest::Client,
    service_account_email: String,
    key: EncodingKey,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokens {
    /// Build a token source from a PEM private key.
    ///
    /// Keys copied from environment variables often carry literal `\n`
    /// sequences instead of line breaks; those are expanded first.
    pub fn new(
        client: reqwest::Client,
        service_account_email: String,
        private_key_pem: &str,
        token_url: String,
    ) -> Result<Self, SheetsError> {
        let pem = normalize_private_key(private_key_pem);
        let key = EncodingKey::from_rsa_pem(pem.as_bytes())?;
        Ok(Self {
            client,
            service_account_email,
            key,
            token_url,
            cached: Mutex::new(None),
        })
    }

    async fn fetch(&self) -> Result<TokenResponse, SheetsError> {
        let claims = AssertionClaims::new(
            &self.service_account_email,
            &self.token_url,
            chrono::Utc::now().timestamp(),
        );
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.key)?;

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SheetsError::Credentials(format!("HTTP {status}: {body}")));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokens {
    async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.fetch().await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(REFRESH_MARGIN);
        tracing::debug!(expires_in = fresh.expires_in, "Obtained Sheets access token");

        *cached = Some(CachedToken {
            token: fresh.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(fresh.access_token)
    }
}

/// Expand escaped newlines in a PEM string.
pub fn normalize_private_key(pem: &str) -> String {
    pem.replace("\\n", "\n")
}
