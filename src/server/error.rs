use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::ai::AiError;
use crate::database::DatabaseError;
use crate::parsing::ParseError;
use crate::resume::ResumeError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Upload(String),

    #[error("{context}")]
    Ai {
        context: &'static str,
        #[source]
        source: AiError,
    },

    #[error("{context}")]
    Parse {
        context: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("{context}")]
    Database {
        context: &'static str,
        #[source]
        source: DatabaseError,
    },

    #[error("{context}")]
    Resume {
        context: &'static str,
        #[source]
        source: ResumeError,
    },
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::Ai { .. }
            | AppError::Parse { .. }
            | AppError::Database { .. }
            | AppError::Resume { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            AppError::BadRequest(_) | AppError::Upload(_) => None,
            AppError::Ai { source, .. } => Some(source.to_string()),
            AppError::Parse { source, .. } => Some(source.to_string()),
            AppError::Database { source, .. } => Some(source.to_string()),
            AppError::Resume { source, .. } => Some(source.to_string()),
        }
    }

    /// Maps a failed field validation to a 400 carrying the first message.
    pub fn from_validation(errors: ValidationErrors, fallback: &str) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| fallback.to_string());
        AppError::BadRequest(message)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };

        (self.status(), Json(body)).into_response()
    }
}
