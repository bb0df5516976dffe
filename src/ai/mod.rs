//! AI client adapter.
//!
//! Every prompt goes through [`TextGenerator::generate`], which returns the
//! model's raw reply text. Two backends exist: Google's hosted
//! `generateContent` API and any OpenAI-compatible chat-completion API.
//! Failures are surfaced once as an [`AiError`]; nothing is retried.

pub mod gemini;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

pub use gemini::GeminiClient;
pub use openai::OpenAIClient;

use crate::config::AppConfig;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("AI request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("AI API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("AI response contained no text")]
    EmptyResponse,
}

// Request URLs can carry credentials, so they never reach error text.
impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        AiError::Request(e.without_url())
    }
}

/// Knobs that influence verbosity. Backends ignore what they don't support.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerateOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl GenerateOptions {
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
        }
    }

    pub const QUESTION: Self = Self::new(200, 0.7);
    pub const EVALUATION: Self = Self::new(400, 0.3);
    pub const FOLLOW_UP: Self = Self::new(200, 0.7);
    pub const RESUME: Self = Self::new(800, 0.5);
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;

    /// Sends `prompt` and returns the raw reply text.
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, AiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Gemini,
    OpenAI,
}

impl AiProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(AiProvider::Gemini),
            "openai" => Some(AiProvider::OpenAI),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini",
            AiProvider::OpenAI => "openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini-2.0-flash",
            AiProvider::OpenAI => "gpt-3.5-turbo",
        }
    }
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<Client, AiError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(5))
        .tcp_keepalive(Duration::from_secs(60))
        .build()?;
    Ok(client)
}

/// Builds the long-lived generator for the configured provider.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn TextGenerator>, AiError> {
    let client = http_client(config.ai_timeout_secs)?;

    match config.provider {
        AiProvider::Gemini => {
            let mut gemini = GeminiClient::new(client, config.api_key.clone(), config.model.clone());
            if let Some(base_url) = &config.base_url {
                gemini = gemini.with_base_url(base_url.clone());
            }
            Ok(Arc::new(gemini))
        }
        AiProvider::OpenAI => {
            let mut openai = OpenAIClient::new(client, config.api_key.clone(), config.model.clone());
            if let Some(base_url) = &config.base_url {
                openai = openai.with_base_url(base_url.clone());
            }
            Ok(Arc::new(openai))
        }
    }
}
