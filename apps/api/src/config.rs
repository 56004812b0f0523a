use std::time::Duration;

use anyhow::{Context, Result};

use crate::vendor::polling::PollConfig;
use crate::vendor::Credentials;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub vendor: Credentials,
    /// Deck generation may run under a separate app id and secret.
    pub ppt_vendor: Credentials,
    pub ppt_api_base_url: String,
    pub resume_api_url: String,
    pub image_api_url: String,
    pub chat_api_url: String,
    pub chat_domain: String,
    pub poll: PollConfig,
    pub http_timeout: Duration,
    /// Shared secret for the admin and delete routes. Unset disables them.
    pub admin_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let app_id = require_env("XF_APP_ID")?;
        let api_key = require_env("XF_API_KEY")?;
        let api_secret = require_env("XF_API_SECRET")?;
        let vendor = Credentials::new(app_id.as_str(), api_key.as_str(), api_secret.as_str())
            .context("Invalid XF_* credentials")?;
        let ppt_vendor = Credentials::new(
            optional_env("XF_PPT_APP_ID").unwrap_or(app_id),
            "",
            optional_env("XF_PPT_API_SECRET").unwrap_or(api_secret),
        )
        .context("Invalid XF_PPT_* credentials")?;

        Ok(Config {
            database_url: optional_env("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://chat_app.db?mode=rwc".to_string()),
            port: parse_env("PORT", 5000)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            vendor,
            ppt_vendor,
            ppt_api_base_url: require_env("PPT_API_BASE_URL")?,
            resume_api_url: require_env("RESUME_API_URL")?,
            image_api_url: require_env("IMAGE_API_URL")?,
            chat_api_url: require_env("CHAT_API_URL")?,
            chat_domain: optional_env("CHAT_DOMAIN").unwrap_or_else(|| "general".to_string()),
            poll: PollConfig {
                interval: Duration::from_secs(parse_env("POLL_INTERVAL_SECS", 3)?),
                timeout: Duration::from_secs(parse_env("POLL_TIMEOUT_SECS", 300)?),
                retry_backoff: Duration::from_millis(parse_env("POLL_RETRY_BACKOFF_MS", 500)?),
            },
            http_timeout: Duration::from_secs(parse_env("HTTP_TIMEOUT_SECS", 60)?),
            admin_token: optional_env("ADMIN_TOKEN"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
