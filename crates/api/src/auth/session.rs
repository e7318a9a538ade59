//! Session tokens for allow-listed submitters.
//!
//! A token is an HS256-signed JWT whose subject is the email address that
//! passed the allow-list check. Holding a token is not enough on its own:
//! every request re-checks the address against the allow-list.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject -- the allow-listed email address.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier, for log correlation.
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in minutes.
    pub expiry_mins: i64,
}

/// Default session lifetime: one working day.
const DEFAULT_EXPIRY_MINS: i64 = 720;

impl SessionConfig {
    /// Load session configuration from environment variables.
    ///
    /// | Env Var               | Required | Default |
    /// |-----------------------|----------|---------|
    /// | `SESSION_SECRET`      | **yes**  | --      |
    /// | `SESSION_EXPIRY_MINS` | no       | `720`   |
    ///
    /// # Panics
    ///
    /// Panics if `SESSION_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("SESSION_SECRET").expect("SESSION_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "SESSION_SECRET must not be empty");

        let expiry_mins: i64 = std::env::var("SESSION_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_EXPIRY_MINS.to_string())
            .parse()
            .expect("SESSION_EXPIRY_MINS must be a valid i64");

        Self {
            secret,
            expiry_mins,
        }
    }

    /// Token lifetime in seconds, as reported to clients.
    pub fn expires_in_secs(&self) -> i64 {
        self.expiry_mins * 60
    }
}

/// Issue a session token for `email`.
pub fn issue_session_token(
    email: &str,
    config: &SessionConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: email.to_string(),
        exp: now + config.expires_in_secs(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a session token and return its claims.
///
/// Checks the signature and expiry.
pub fn validate_session_token(
    token: &str,
    config: &SessionConfig,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
