use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use marketai_api::ApiConfig;

/// Placeholder JWT secret that must not reach production.
pub const PLACEHOLDER_SECRET: &str = "dev-secret-change-me";

/// Server configuration loaded from environment variables.
///
/// | Env Var                      | Default                 |
/// |------------------------------|-------------------------|
/// | `MARKETAI_HOST`              | `0.0.0.0`               |
/// | `MARKETAI_PORT`              | `5000`                  |
/// | `MARKETAI_DB_PATH`           | `marketai.db`           |
/// | `MARKETAI_JWT_SECRET`        | `dev-secret-change-me`  |
/// | `MARKETAI_EDIT_API_URL`      | `http://localhost:8000` |
/// | `MARKETAI_EDIT_TIMEOUT_SECS` | `120`                   |
/// | `MARKETAI_UPLOAD_DELAY_MS`   | `1000`                  |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub api: ApiConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port: u16 = var("MARKETAI_PORT", "5000")
            .parse()
            .context("MARKETAI_PORT must be a valid port")?;
        let edit_timeout_secs: u64 = var("MARKETAI_EDIT_TIMEOUT_SECS", "120")
            .parse()
            .context("MARKETAI_EDIT_TIMEOUT_SECS must be a whole number of seconds")?;
        let upload_delay_ms: u64 = var("MARKETAI_UPLOAD_DELAY_MS", "1000")
            .parse()
            .context("MARKETAI_UPLOAD_DELAY_MS must be a whole number of milliseconds")?;

        Ok(Self {
            host: var("MARKETAI_HOST", "0.0.0.0"),
            port,
            db_path: var("MARKETAI_DB_PATH", "marketai.db").into(),
            api: ApiConfig {
                jwt_secret: var("MARKETAI_JWT_SECRET", PLACEHOLDER_SECRET),
                edit_api_url: var("MARKETAI_EDIT_API_URL", "http://localhost:8000"),
                edit_timeout: Duration::from_secs(edit_timeout_secs),
                upload_delay: Duration::from_millis(upload_delay_ms),
            },
        })
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        self.api.jwt_secret.is_empty() || self.api.jwt_secret == PLACEHOLDER_SECRET
    }
}
