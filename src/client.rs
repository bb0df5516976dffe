//! Typed HTTP client for the coach API.
//!
//! The view logic in [`crate::practice`] talks to the backend only through
//! [`CoachApi`], so it can be driven by a fake in tests.

use std::time::Duration;

use async_trait::async_trait;
use log::{info, error};
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::database::InterviewSession;
use crate::parsing::Evaluation;
use crate::resume::{PDF_MIME, RESUME_FIELD};
use crate::server::payloads::{
    EvaluateAnswerRequest, FollowUpRequest, FollowUpResponse, GenerateQuestionRequest,
    GenerateQuestionResponse, ResumeQuestionsResponse,
};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },
}

impl ClientError {
    /// The `error` message from the server's JSON body, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Server { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .unwrap_or_default();
        ClientError::Server { status, message }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[async_trait]
pub trait CoachApi: Send + Sync {
    async fn generate_question(&self, topic: &str) -> Result<String, ClientError>;

    async fn evaluate_answer(&self, question: &str, answer: &str) -> Result<Evaluation, ClientError>;

    async fn generate_follow_up(&self, original_question: &str, previous_answer: &str) -> Result<String, ClientError>;

    /// Uploads a PDF resume as the `resume` multipart field.
    async fn generate_from_resume(&self, file_name: &str, pdf: Vec<u8>) -> Result<Vec<String>, ClientError>;

    async fn list_sessions(&self) -> Result<Vec<InterviewSession>, ClientError>;
}

#[derive(Clone)]
pub struct CoachClient {
    client: Client,
    base_url: String,
}

impl CoachClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let err = ClientError::from_body(status.as_u16(), &body);
    error!("Coach API error: {}", err);
    Err(err)
}

#[async_trait]
impl CoachApi for CoachClient {
    async fn generate_question(&self, topic: &str) -> Result<String, ClientError> {
        let request = GenerateQuestionRequest {
            topic: Some(topic.to_string()),
        };
        let response = self
            .client
            .post(self.url("/api/generate-question"))
            .json(&request)
            .send()
            .await?;

        let body: GenerateQuestionResponse = read_json(response).await?;
        Ok(body.question)
    }

    async fn evaluate_answer(&self, question: &str, answer: &str) -> Result<Evaluation, ClientError> {
        let request = EvaluateAnswerRequest {
            question: Some(question.to_string()),
            answer: Some(answer.to_string()),
        };
        let response = self
            .client
            .post(self.url("/api/evaluate-answer"))
            .json(&request)
            .send()
            .await?;

        read_json(response).await
    }

    async fn generate_follow_up(&self, original_question: &str, previous_answer: &str) -> Result<String, ClientError> {
        let request = FollowUpRequest {
            original_question: Some(original_question.to_string()),
            previous_answer: Some(previous_answer.to_string()),
        };
        let response = self
            .client
            .post(self.url("/api/generate-follow-up"))
            .json(&request)
            .send()
            .await?;

        let body: FollowUpResponse = read_json(response).await?;
        Ok(body.follow_up_question)
    }

    async fn generate_from_resume(&self, file_name: &str, pdf: Vec<u8>) -> Result<Vec<String>, ClientError> {
        info!("📄 Uploading resume {} ({} bytes)", file_name, pdf.len());

        let part = multipart::Part::bytes(pdf)
            .file_name(file_name.to_string())
            .mime_str(PDF_MIME)?;
        let form = multipart::Form::new().part(RESUME_FIELD, part);

        let response = self
            .client
            .post(self.url("/api/generate-from-resume"))
            .multipart(form)
            .send()
            .await?;

        let body: ResumeQuestionsResponse = read_json(response).await?;
        Ok(body.questions)
    }

    async fn list_sessions(&self) -> Result<Vec<InterviewSession>, ClientError> {
        let response = self.client.get(self.url("/api/sessions")).send().await?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_message_is_surfaced() {
        let err = ClientError::from_body(400, r#"{"error":"A topic is required."}"#);
        assert_eq!(err.server_message(), Some("A topic is required."));

        let err = ClientError::from_body(500, r#"{"error":"Error evaluating answer","details":"timeout"}"#);
        assert_eq!(err.server_message(), Some("Error evaluating answer"));
        assert_eq!(err.to_string(), "Server returned 500: Error evaluating answer");
    }

    #[test]
    fn test_non_json_error_body_has_no_message() {
        let err = ClientError::from_body(502, "<html>Bad Gateway</html>");
        assert!(err.server_message().is_none());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = CoachClient::with_client(Client::new(), "http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/api/sessions"), "http://localhost:5000/api/sessions");
    }
}
