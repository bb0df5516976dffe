//! Resume upload rules and PDF text extraction.

use log::{info, error};
use thiserror::Error;

pub const PDF_MIME: &str = "application/pdf";
pub const RESUME_FIELD: &str = "resume";

#[derive(Error, Debug)]
pub enum ResumeError {
    #[error("Only PDF files are allowed")]
    NotPdf,
    #[error("Resume file exceeds the {}MB limit", .limit / (1024 * 1024))]
    TooLarge { limit: usize },
    #[error("Failed to extract PDF text: {0}")]
    Extraction(String),
    #[error("Resume contains no extractable text")]
    NoText,
}

/// Upload gate applied before any extraction or AI call.
pub fn check_upload(content_type: Option<&str>, len: usize, limit: usize) -> Result<(), ResumeError> {
    let is_pdf = content_type
        .map(|ct| ct.split(';').next().unwrap_or_default().trim().eq_ignore_ascii_case(PDF_MIME))
        .unwrap_or(false);

    if !is_pdf {
        return Err(ResumeError::NotPdf);
    }
    if len > limit {
        return Err(ResumeError::TooLarge { limit });
    }
    Ok(())
}

/// Extracts text on the blocking pool; PDF parsing is CPU bound.
pub async fn extract_text(bytes: Vec<u8>) -> Result<String, ResumeError> {
    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ResumeError::Extraction(e.to_string()))?
        .map_err(|e| {
            error!("PDF extraction failed: {}", e);
            ResumeError::Extraction(e.to_string())
        })?;

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ResumeError::NoText);
    }

    info!("Extracted {} characters from {} byte resume", text.len(), size);
    Ok(text)
}
