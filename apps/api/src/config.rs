use anyhow::{Context, Result};

use crate::review::ingest::DEFAULT_MAX_UPLOAD_MB;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_mb: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_mb: match std::env::var("MAX_UPLOAD_MB") {
                Ok(value) => value
                    .parse::<usize>()
                    .context("MAX_UPLOAD_MB must be a positive integer")?,
                Err(_) => DEFAULT_MAX_UPLOAD_MB,
            },
        })
    }

    /// Request body ceiling: the upload limit plus room for multipart framing.
    pub fn body_limit_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024 + 64 * 1024
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
