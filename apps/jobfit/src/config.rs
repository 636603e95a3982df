use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Client configuration loaded from environment variables.
/// Fails at startup if the job-search credentials are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub adzuna_app_id: String,
    pub adzuna_app_key: String,
    pub adzuna_region: String,
    pub backend_url: String,
    pub register_path: String,
    pub data_dir: PathBuf,
    pub http_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            adzuna_app_id: require_env("ADZUNA_APP_ID")?,
            adzuna_app_key: require_env("ADZUNA_APP_KEY")?,
            adzuna_region: env_or("ADZUNA_REGION", "gb"),
            backend_url: env_or("JOBFIT_BACKEND_URL", "http://localhost:5000"),
            register_path: env_or("JOBFIT_REGISTER_PATH", "/api/register"),
            data_dir: PathBuf::from(env_or("JOBFIT_DATA_DIR", ".jobfit")),
            http_timeout: Duration::from_secs(
                env_or("JOBFIT_HTTP_TIMEOUT_SECS", "30")
                    .parse::<u64>()
                    .context("JOBFIT_HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
