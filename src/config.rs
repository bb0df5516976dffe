use serde::Deserialize;
use log::{info, warn};
use thiserror::Error;

use crate::ai::AiProvider;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
    #[error("Unknown AI provider: {0}")]
    UnknownProvider(String),
    #[error("Missing credential: {0} must be set")]
    MissingCredential(&'static str),
}

/// Raw key/value view of the environment, before provider-specific defaults
/// are resolved.
#[derive(Debug, Deserialize)]
struct RawConfig {
    ai_provider: String,
    gemini_api_key: Option<String>,
    openai_api_key: Option<String>,
    ai_model: Option<String>,
    ai_base_url: Option<String>,
    ai_timeout_secs: u64,
    cors_origin: String,
    port: u16,
    database_url: Option<String>,
    max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: AiProvider,
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub ai_timeout_secs: u64,
    pub cors_origin: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Reads `.env` (when present) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            info!("No .env file loaded ({}), using process environment", e);
        }

        let settings = config::Config::builder()
            .set_default("ai_provider", "gemini")?
            .set_default("ai_timeout_secs", 30_i64)?
            .set_default("cors_origin", "http://localhost:5173")?
            .set_default("port", 5000_i64)?
            .set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as i64)?
            .add_source(config::Environment::default())
            .build()?;

        let raw: RawConfig = settings.try_deserialize()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let provider = AiProvider::from_str(&raw.ai_provider)
            .ok_or_else(|| ConfigError::UnknownProvider(raw.ai_provider.clone()))?;

        let api_key = match provider {
            AiProvider::Gemini => non_empty(raw.gemini_api_key)
                .ok_or(ConfigError::MissingCredential("GEMINI_API_KEY"))?,
            AiProvider::OpenAI => non_empty(raw.openai_api_key)
                .ok_or(ConfigError::MissingCredential("OPENAI_API_KEY"))?,
        };

        let model = non_empty(raw.ai_model).unwrap_or_else(|| provider.default_model().to_string());

        let database_url = non_empty(raw.database_url);
        if database_url.is_none() {
            warn!("DATABASE_URL not set - sessions will only be kept in memory");
        }

        Ok(Self {
            provider,
            api_key,
            model,
            base_url: non_empty(raw.ai_base_url),
            ai_timeout_secs: raw.ai_timeout_secs,
            cors_origin: raw.cors_origin,
            port: raw.port,
            database_url,
            max_upload_bytes: raw.max_upload_bytes,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
