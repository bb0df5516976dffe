use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::{NoTls, Row};
use log::{info, error};

use super::{DatabaseError, Result, SessionStore};
use super::models::{InterviewSession, NewInterviewSession};

#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    pool: Pool,
}

impl PostgresSessionStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.url = Some(database_url.to_string());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DatabaseError::ConnectionFailed(format!("Pool creation failed: {}", e)))?;

        // Test connection
        let _client = pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(format!("Connection test failed: {}", e)))?;

        info!("Database connection established successfully");

        Ok(Self { pool })
    }

    /// Creates the sessions table if it does not exist yet.
    pub async fn init(&self) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        client
            .batch_execute(
                r#"
                CREATE TABLE IF NOT EXISTS interview_sessions (
                    id UUID PRIMARY KEY,
                    question TEXT NOT NULL,
                    answer TEXT NOT NULL,
                    score INTEGER NOT NULL,
                    feedback TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );
                CREATE INDEX IF NOT EXISTS interview_sessions_created_at_idx
                    ON interview_sessions (created_at DESC);
                "#,
            )
            .await
            .map_err(|e| {
                error!("Failed to initialize interview_sessions table: {}", e);
                DatabaseError::QueryFailed(format!("Schema setup failed: {}", e))
            })?;

        Ok(())
    }

    fn row_to_session(row: &Row) -> InterviewSession {
        InterviewSession {
            id: row.get(0),
            question: row.get(1),
            answer: row.get(2),
            score: row.get(3),
            feedback: row.get(4),
            created_at: row.get(5),
        }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create(&self, session: NewInterviewSession) -> Result<InterviewSession> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let session = session.into_session(chrono::Utc::now());

        client
            .execute(
                r#"
                INSERT INTO interview_sessions (id, question, answer, score, feedback, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
                &[
                    &session.id,
                    &session.question,
                    &session.answer,
                    &session.score,
                    &session.feedback,
                    &session.created_at,
                ],
            )
            .await
            .map_err(|e| {
                error!("Failed to insert interview session: {}", e);
                DatabaseError::QueryFailed(format!("Failed to insert interview session: {}", e))
            })?;

        Ok(session)
    }

    async fn list_all(&self) -> Result<Vec<InterviewSession>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let rows = client
            .query(
                r#"
                SELECT id, question, answer, score, feedback, created_at
                FROM interview_sessions
                ORDER BY created_at DESC
                "#,
                &[],
            )
            .await
            .map_err(|e| {
                error!("Failed to fetch interview sessions: {}", e);
                DatabaseError::QueryFailed(format!("Failed to fetch interview sessions: {}", e))
            })?;

        Ok(rows.iter().map(Self::row_to_session).collect())
    }
}
