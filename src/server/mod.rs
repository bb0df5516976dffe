//! HTTP API.
//!
//! Handlers are independent and hold no cross-request state; the only shared
//! pieces are the AI generator and the session store inside [`AppState`].

pub mod error;
pub mod handlers;
pub mod payloads;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use log::{info, error};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;

use crate::ai::{self, TextGenerator};
use crate::config::AppConfig;
use crate::database::{self, SessionStore};

pub use error::AppError;

/// Room for multipart boundaries and part headers around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub ai: Arc<dyn TextGenerator>,
    pub store: Arc<dyn SessionStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(ai: Arc<dyn TextGenerator>, store: Arc<dyn SessionStore>, max_upload_bytes: usize) -> Self {
        Self {
            ai,
            store,
            max_upload_bytes,
        }
    }
}

pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = origin.parse()?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60)))
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let upload_limit = state.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/sessions", get(handlers::list_sessions))
        .route("/api/generate-question", post(handlers::generate_question))
        .route("/api/evaluate-answer", post(handlers::evaluate_answer))
        .route("/api/generate-follow-up", post(handlers::generate_follow_up))
        .route(
            "/api/generate-from-resume",
            post(handlers::generate_from_resume).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .layer(cors)
        .with_state(state)
}

/// Wires the configured AI backend and store, then serves until a shutdown
/// signal arrives.
pub async fn serve(config: AppConfig) -> Result<()> {
    info!("Initializing state...");

    let generator = ai::from_config(&config)?;
    info!("Using {} provider with model {}", generator.name(), generator.model());

    let store = database::connect(config.database_url.as_deref()).await?;
    let state = AppState::new(generator, store, config.max_upload_bytes);

    let app = router(state, cors_layer(&config.cors_origin)?);

    let address = config.bind_address();
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server is running on http://{address} (CORS origin: {})", config.cors_origin);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
