use std::path::PathBuf;

use crate::auth::session::SessionConfig;

/// Default multipart body limit: 25 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields except the session secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
    /// Directory served at `/` for the browser forms, if any.
    pub static_dir: Option<PathBuf>,
    /// Public registration link offered to addresses not on the allow-list.
    pub register_url: Option<String>,
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `60`                       |
    /// | `MAX_UPLOAD_BYTES`     | `26214400`                 |
    /// | `STATIC_DIR`           | unset                      |
    /// | `REGISTER_URL`         | unset                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let register_url = std::env::var("REGISTER_URL").ok().filter(|v| !v.is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            static_dir,
            register_url,
            session: SessionConfig::from_env(),
        }
    }
}
