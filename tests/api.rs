mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{app, app_with, FailingSessionStore, ScriptedGenerator};
use interview_coach_lib::ai::GeminiClient;
use interview_coach_lib::database::MemorySessionStore;

const BOUNDARY: &str = "coach-test-boundary";
const RESUME_PDF: &[u8] = include_bytes!("fixtures/resume.pdf");

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn upload(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/generate-from-resume")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_root_reports_running() {
    let app = app(ScriptedGenerator::replying(""), MemorySessionStore::new());
    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"AI Interview Coach Backend is running!");
}

#[tokio::test]
async fn test_generate_question_is_trimmed_and_unquoted() {
    let generator = ScriptedGenerator::replying("  \"How do you handle disagreement?\"\n");
    let app = app(generator.clone(), MemorySessionStore::new());

    let (status, body) = send(app, post_json("/api/generate-question", json!({ "topic": "teamwork" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "question": "How do you handle disagreement?" }));
    assert!(generator.last_prompt().unwrap().contains("teamwork"));
}

#[tokio::test]
async fn test_generate_question_requires_topic() {
    let generator = ScriptedGenerator::replying("unused");

    for payload in [json!({}), json!({ "topic": "" })] {
        let app = app(generator.clone(), MemorySessionStore::new());
        let (status, body) = send(app, post_json("/api/generate-question", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "A topic is required.");
    }
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_ai_failure_is_a_500() {
    let app = app(ScriptedGenerator::failing(), MemorySessionStore::new());
    let (status, body) = send(app, post_json("/api/generate-question", json!({ "topic": "rust" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate question from AI.");
    assert!(body["details"].as_str().unwrap().contains("429"));
}

#[tokio::test]
async fn test_evaluation_in_code_fence_is_stored_once() {
    let generator = ScriptedGenerator::replying(
        "Here is my assessment:\n```json\n{\"score\": 8, \"feedback\": \"Clear structure, add metrics.\"}\n```",
    );
    let store = MemorySessionStore::new();
    let app = app(generator, store.clone());

    let (status, body) = send(
        app,
        post_json("/api/evaluate-answer", json!({ "question": "Q1", "answer": "A1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "score": 8, "feedback": "Clear structure, add metrics." }));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_unparseable_evaluation_stores_nothing() {
    let store = MemorySessionStore::new();
    let app = app(ScriptedGenerator::replying("I would give this a solid eight."), store.clone());

    let (status, body) = send(
        app,
        post_json("/api/evaluate-answer", json!({ "question": "Q", "answer": "A" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error parsing evaluation response");
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_evaluate_requires_question_and_answer() {
    let app = app(ScriptedGenerator::replying("{}"), MemorySessionStore::new());
    let (status, body) = send(app, post_json("/api/evaluate-answer", json!({ "question": "Q" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Question and answer are required");
}

#[tokio::test]
async fn test_sessions_are_listed_newest_first() {
    let store = MemorySessionStore::new();
    let generator = ScriptedGenerator::replying(r#"{"score": 6, "feedback": "ok"}"#);

    for n in 1..=3 {
        let app = app(generator.clone(), store.clone());
        let payload = json!({ "question": format!("Q{n}"), "answer": format!("A{n}") });
        let (status, _) = send(app, post_json("/api/evaluate-answer", payload)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let app = app(generator, store);
    let (status, body) = send(app, get("/api/sessions")).await;
    assert_eq!(status, StatusCode::OK);

    let sessions = body.as_array().unwrap();
    let questions: Vec<&str> = sessions.iter().map(|s| s["question"].as_str().unwrap()).collect();
    assert_eq!(questions, vec!["Q3", "Q2", "Q1"]);
    assert_eq!(sessions[0]["answer"], "A3");
    assert_eq!(sessions[0]["score"], 6);
    assert!(sessions[0]["createdAt"].is_string());
    assert!(sessions[0]["id"].is_string());
}

#[tokio::test]
async fn test_follow_up_gets_question_mark() {
    let app = app(
        ScriptedGenerator::replying("\"what was your biggest challenge\""),
        MemorySessionStore::new(),
    );
    let payload = json!({ "originalQuestion": "Tell me about a project.", "previousAnswer": "I built a cache." });
    let (status, body) = send(app, post_json("/api/generate-follow-up", payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "followUpQuestion": "what was your biggest challenge?" }));
}

#[tokio::test]
async fn test_follow_up_requires_both_fields() {
    let app = app(ScriptedGenerator::replying("why?"), MemorySessionStore::new());
    let payload = json!({ "originalQuestion": "Q", "previousAnswer": "" });
    let (status, body) = send(app, post_json("/api/generate-follow-up", payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Both originalQuestion and previousAnswer are required.");
}

#[tokio::test]
async fn test_non_pdf_upload_never_reaches_ai() {
    let generator = ScriptedGenerator::replying(r#"["Why?"]"#);
    let app = app(generator.clone(), MemorySessionStore::new());

    let (status, body) = send(app, upload("resume", "resume.txt", "text/plain", b"plain text resume")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only PDF files are allowed");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_missing_resume_field() {
    let generator = ScriptedGenerator::replying(r#"["Why?"]"#);

    let app_one = app(generator.clone(), MemorySessionStore::new());
    let (status, body) = send(app_one, upload("attachment", "cv.pdf", "application/pdf", b"%PDF")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No resume file uploaded.");

    let app_two = app(generator.clone(), MemorySessionStore::new());
    let (status, body) = send(app_two, post_json("/api/generate-from-resume", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No resume file uploaded.");

    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_unreadable_pdf_is_a_500() {
    let generator = ScriptedGenerator::replying(r#"["Why?"]"#);
    let app = app(generator.clone(), MemorySessionStore::new());

    let (status, body) = send(app, upload("resume", "cv.pdf", "application/pdf", b"not really a pdf")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to process resume and generate questions.");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_ai_transport_error_does_not_leak_api_key() {
    let gemini = GeminiClient::new(
        reqwest::Client::new(),
        "SECRET-KEY-123".to_string(),
        "gemini-2.0-flash".to_string(),
    )
    .with_base_url("http://127.0.0.1:1/v1beta".to_string());
    let app = app_with(Arc::new(gemini), Arc::new(MemorySessionStore::new()));

    let (status, body) = send(app, post_json("/api/generate-question", json!({ "topic": "rust" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate question from AI.");
    assert!(!body.to_string().contains("SECRET-KEY-123"));
}

#[tokio::test]
async fn test_store_write_failure_still_returns_evaluation() {
    let generator = ScriptedGenerator::replying(r#"{"score": 7, "feedback": "Good use of examples."}"#);
    let app = app_with(generator, Arc::new(FailingSessionStore));

    let (status, body) = send(
        app,
        post_json("/api/evaluate-answer", json!({ "question": "Q", "answer": "A" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "score": 7, "feedback": "Good use of examples." }));
}

#[tokio::test]
async fn test_store_read_failure_is_a_500() {
    let app = app_with(ScriptedGenerator::replying(""), Arc::new(FailingSessionStore));
    let (status, body) = send(app, get("/api/sessions")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch interview sessions");
}

#[tokio::test]
async fn test_resume_questions_from_pdf() {
    let generator = ScriptedGenerator::replying(
        "```json\n[\"What did you build at Acme?\", \"Why did you pick Rust?\"]\n```",
    );
    let app = app(generator.clone(), MemorySessionStore::new());

    let (status, body) = send(app, upload("resume", "resume.pdf", "application/pdf", RESUME_PDF)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "questions": ["What did you build at Acme?", "Why did you pick Rust?"] })
    );
    assert_eq!(generator.calls(), 1);

    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains("Acme"));
    assert!(prompt.contains("Rust"));
}
