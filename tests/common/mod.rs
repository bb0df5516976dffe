#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use parking_lot::Mutex;

use interview_coach_lib::ai::{AiError, GenerateOptions, TextGenerator};
use interview_coach_lib::database::{
    DatabaseError, InterviewSession, MemorySessionStore, NewInterviewSession, SessionStore,
};
use interview_coach_lib::server::{self, AppState};

pub const UPLOAD_LIMIT: usize = 5 * 1024 * 1024;

/// Returns a fixed reply (or a fixed failure) and records every prompt.
pub struct ScriptedGenerator {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, prompt: &str, _options: &GenerateOptions) -> Result<String, AiError> {
        self.prompts.lock().push(prompt.to_string());
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(AiError::Api {
                status: 429,
                body: "rate limited".to_string(),
            }),
        }
    }
}

/// Store whose every operation fails, as if the database were down.
pub struct FailingSessionStore;

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn create(&self, _session: NewInterviewSession) -> Result<InterviewSession, DatabaseError> {
        Err(DatabaseError::ConnectionFailed("connection refused".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<InterviewSession>, DatabaseError> {
        Err(DatabaseError::QueryFailed("relation does not exist".to_string()))
    }
}

pub fn app(generator: Arc<ScriptedGenerator>, store: MemorySessionStore) -> Router {
    app_with(generator, Arc::new(store))
}

pub fn app_with(generator: Arc<dyn TextGenerator>, store: Arc<dyn SessionStore>) -> Router {
    let state = AppState::new(generator, store, UPLOAD_LIMIT);
    let cors = server::cors_layer("http://localhost:5173").unwrap();
    server::router(state, cors)
}
