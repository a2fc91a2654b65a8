//! Server configuration read from the environment (and `.env`, when present).

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:finance.db";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_TRIAL_DAYS: i64 = 7;
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Persistent SQLite database at `DATABASE_URL`
    Sqlite,
    /// Process-local store seeded with demo data
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("Unknown storage backend '{}', expected sqlite or memory", other)),
        }
    }
}

/// Settings of the chat-completion endpoint
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub storage_backend: StorageBackend,
    pub cors_origin: String,
    pub trial_days: i64,
    pub log_filter: String,
    /// `None` when no API key is configured
    pub llm: Option<LlmConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = value("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR is not a valid socket address")?;

        let storage_backend = match value("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StorageBackend::Sqlite,
        };

        let trial_days = match value("TRIAL_DAYS") {
            Some(raw) => raw.parse::<i64>().context("TRIAL_DAYS must be an integer")?,
            None => DEFAULT_TRIAL_DAYS,
        };
        if trial_days < 0 {
            return Err(anyhow!("TRIAL_DAYS cannot be negative"));
        }

        let llm = match value("OPENAI_API_KEY") {
            Some(api_key) => {
                let timeout_secs = match value("OPENAI_TIMEOUT_SECS") {
                    Some(raw) => raw.parse::<u64>().context("OPENAI_TIMEOUT_SECS must be an integer")?,
                    None => DEFAULT_OPENAI_TIMEOUT_SECS,
                };
                Some(LlmConfig {
                    api_key,
                    api_url: value("OPENAI_API_URL")
                        .unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string())
                        .trim_end_matches('/')
                        .to_string(),
                    model: value("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                    timeout: Duration::from_secs(timeout_secs),
                })
            }
            None => None,
        };

        Ok(Self {
            bind_addr,
            database_url: value("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            storage_backend,
            cors_origin: value("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            trial_days,
            log_filter: value("LOG_FILTER").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            llm,
        })
    }
}
