use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::{Result, SessionStore};
use super::models::{InterviewSession, NewInterviewSession};

/// Process-local store, used when no database is configured and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<Vec<InterviewSession>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: NewInterviewSession) -> Result<InterviewSession> {
        let session = session.into_session(Utc::now());
        self.sessions.lock().push(session.clone());
        Ok(session)
    }

    async fn list_all(&self) -> Result<Vec<InterviewSession>> {
        let mut sessions = self.sessions.lock().clone();
        // Stable sort over the reversed insertion order keeps the latest
        // insert first among equal timestamps.
        sessions.reverse();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamp() {
        let store = MemorySessionStore::new();
        let before = Utc::now();
        let session = store
            .create(NewInterviewSession::new("Q".into(), "A".into(), 7, "F".into()))
            .await
            .unwrap();

        assert!(session.created_at >= before);
        assert_eq!(session.score, 7);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let store = MemorySessionStore::new();
        for i in 1..=3 {
            store
                .create(NewInterviewSession::new(format!("Q{}", i), "A".into(), i, "F".into()))
                .await
                .unwrap();
        }

        let listed = store.list_all().await.unwrap();
        let questions: Vec<_> = listed.iter().map(|s| s.question.as_str()).collect();
        assert_eq!(questions, vec!["Q3", "Q2", "Q1"]);
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemorySessionStore::new();
        assert!(store.is_empty());
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
