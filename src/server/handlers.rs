use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    Json,
};
use log::{info, warn, error};
use validator::Validate;

use super::error::AppError;
use super::payloads::*;
use super::AppState;
use crate::ai::GenerateOptions;
use crate::database::{InterviewSession, NewInterviewSession};
use crate::parsing::{self, Evaluation};
use crate::prompts;
use crate::resume::{self, ResumeError, RESUME_FIELD};

const QUESTION_FAILED: &str = "Failed to generate question from AI.";
const EVALUATION_FAILED: &str = "Error evaluating answer";
const EVALUATION_PARSE_FAILED: &str = "Error parsing evaluation response";
const FOLLOW_UP_FAILED: &str = "Failed to generate follow-up question";
const RESUME_FAILED: &str = "Failed to process resume and generate questions.";
const SESSIONS_FAILED: &str = "Failed to fetch interview sessions";
const NO_RESUME: &str = "No resume file uploaded.";

pub async fn root() -> &'static str {
    "AI Interview Coach Backend is running!"
}

pub async fn list_sessions(State(state): State<AppState>) -> Result<Json<Vec<InterviewSession>>, AppError> {
    let sessions = state.store.list_all().await.map_err(|source| {
        error!("Error fetching sessions: {}", source);
        AppError::Database { context: SESSIONS_FAILED, source }
    })?;

    info!("Returning {} interview sessions", sessions.len());
    Ok(Json(sessions))
}

pub async fn generate_question(
    State(state): State<AppState>,
    payload: Result<Json<GenerateQuestionRequest>, JsonRejection>,
) -> Result<Json<GenerateQuestionResponse>, AppError> {
    let Json(request) = payload?;
    request
        .validate()
        .map_err(|e| AppError::from_validation(e, TOPIC_REQUIRED))?;
    let topic = request.topic.unwrap_or_default();

    info!("Generating question for topic: {}", topic);

    let raw = state
        .ai
        .generate(&prompts::question_prompt(&topic), &GenerateOptions::QUESTION)
        .await
        .map_err(|source| {
            error!("Error calling {} for question: {}", state.ai.name(), source);
            AppError::Ai { context: QUESTION_FAILED, source }
        })?;

    Ok(Json(GenerateQuestionResponse {
        question: parsing::parse_question(&raw),
    }))
}

pub async fn evaluate_answer(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateAnswerRequest>, JsonRejection>,
) -> Result<Json<Evaluation>, AppError> {
    let Json(request) = payload?;
    request
        .validate()
        .map_err(|e| AppError::from_validation(e, QUESTION_AND_ANSWER_REQUIRED))?;
    let question = request.question.unwrap_or_default();
    let answer = request.answer.unwrap_or_default();

    info!("Evaluating answer ({} chars)", answer.len());

    let raw = state
        .ai
        .generate(&prompts::evaluation_prompt(&question, &answer), &GenerateOptions::EVALUATION)
        .await
        .map_err(|source| {
            error!("Error in evaluation: {}", source);
            AppError::Ai { context: EVALUATION_FAILED, source }
        })?;

    let evaluation = parsing::parse_evaluation(&raw).map_err(|source| {
        error!("Error parsing AI response: {} - raw response: {}", source, raw);
        AppError::Parse { context: EVALUATION_PARSE_FAILED, source }
    })?;

    // Persistence is best-effort: the score is returned even if the write fails.
    match state
        .store
        .create(NewInterviewSession::from_evaluation(question, answer, &evaluation))
        .await
    {
        Ok(session) => info!("Interview session {} saved to database", session.id),
        Err(e) => warn!("Failed to save session to database: {}", e),
    }

    Ok(Json(evaluation))
}

pub async fn generate_follow_up(
    State(state): State<AppState>,
    payload: Result<Json<FollowUpRequest>, JsonRejection>,
) -> Result<Json<FollowUpResponse>, AppError> {
    let Json(request) = payload?;
    request
        .validate()
        .map_err(|e| AppError::from_validation(e, FOLLOW_UP_FIELDS_REQUIRED))?;
    let original_question = request.original_question.unwrap_or_default();
    let previous_answer = request.previous_answer.unwrap_or_default();

    info!("Generating follow-up question");

    let raw = state
        .ai
        .generate(
            &prompts::follow_up_prompt(&original_question, &previous_answer),
            &GenerateOptions::FOLLOW_UP,
        )
        .await
        .map_err(|source| {
            error!("Error generating follow-up question: {}", source);
            AppError::Ai { context: FOLLOW_UP_FAILED, source }
        })?;

    let follow_up_question = parsing::parse_follow_up(&raw).map_err(|source| {
        error!("Error cleaning follow-up question: {} - raw response: {}", source, raw);
        AppError::Parse { context: FOLLOW_UP_FAILED, source }
    })?;

    Ok(Json(FollowUpResponse { follow_up_question }))
}

pub async fn generate_from_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResumeQuestionsResponse>, AppError> {
    let mut multipart = multipart.map_err(|_| AppError::BadRequest(NO_RESUME.to_string()))?;
    let bytes = read_resume_field(&mut multipart, state.max_upload_bytes)
        .await?
        .ok_or_else(|| AppError::BadRequest(NO_RESUME.to_string()))?;

    info!("Processing resume upload ({} bytes)", bytes.len());

    let resume_text = resume::extract_text(bytes).await.map_err(|source| {
        error!("Error processing resume: {}", source);
        AppError::Resume { context: RESUME_FAILED, source }
    })?;

    let raw = state
        .ai
        .generate(&prompts::resume_prompt(&resume_text), &GenerateOptions::RESUME)
        .await
        .map_err(|source| {
            error!("Error generating resume questions: {}", source);
            AppError::Ai { context: RESUME_FAILED, source }
        })?;

    let questions = parsing::parse_resume_questions(&raw);
    if questions.is_empty() {
        warn!("No questions could be parsed from AI response: {}", raw);
    }

    Ok(Json(ResumeQuestionsResponse { questions }))
}

/// Reads the `resume` field, applying the type and size gate before the
/// body is buffered and again on the buffered length.
async fn read_resume_field(multipart: &mut Multipart, limit: usize) -> Result<Option<Vec<u8>>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(e.body_text()))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        resume::check_upload(content_type.as_deref(), 0, limit).map_err(upload_error)?;

        let bytes = field.bytes().await.map_err(|e| {
            warn!("Failed to read resume upload: {}", e);
            AppError::Upload(ResumeError::TooLarge { limit }.to_string())
        })?;
        resume::check_upload(content_type.as_deref(), bytes.len(), limit).map_err(upload_error)?;

        return Ok(Some(bytes.to_vec()));
    }

    Ok(None)
}

fn upload_error(e: ResumeError) -> AppError {
    warn!("Rejected resume upload: {}", e);
    AppError::Upload(e.to_string())
}
