use anyhow::Result;
use log::info;

pub mod ai;
pub mod client;
pub mod config;
pub mod database;
pub mod interview;
pub mod parsing;
pub mod practice;
pub mod prompts;
pub mod resume;
pub mod server;

use config::AppConfig;

pub async fn run() -> Result<()> {
    info!("🚀 Interview coach backend starting...");

    let config = AppConfig::load()?;
    log_config_status(&config);

    server::serve(config).await
}

fn log_config_status(config: &AppConfig) {
    info!("Environment configuration:");
    info!("  AI_PROVIDER: {}", config.provider.as_str());
    info!("  AI_MODEL: {}", config.model);
    info!("  CORS_ORIGIN: {}", config.cors_origin);
    info!("  PORT: {}", config.port);
    info!(
        "  DATABASE_URL: {}",
        if config.database_url.is_some() { "✅ Available" } else { "❌ Missing (using in-memory store)" }
    );
}
