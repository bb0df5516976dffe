pub mod postgres;
pub mod models;
pub mod memory;

pub use postgres::PostgresSessionStore;
pub use memory::MemorySessionStore;
pub use models::{InterviewSession, NewInterviewSession};

use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Persistence for answered questions. Records are append-only.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a record and assigns its id and creation time.
    async fn create(&self, session: NewInterviewSession) -> Result<InterviewSession>;

    /// Every stored record, newest first.
    async fn list_all(&self) -> Result<Vec<InterviewSession>>;
}

/// Connects to Postgres when a URL is configured, otherwise keeps records
/// in process memory.
pub async fn connect(database_url: Option<&str>) -> Result<Arc<dyn SessionStore>> {
    match database_url {
        Some(url) => {
            let store = PostgresSessionStore::connect(url).await?;
            store.init().await?;
            info!("Using Postgres session store");
            Ok(Arc::new(store))
        }
        None => {
            warn!("Using in-memory session store, history is lost on restart");
            Ok(Arc::new(MemorySessionStore::new()))
        }
    }
}
