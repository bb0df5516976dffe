//! Request and response bodies of the JSON API.
//!
//! Request fields are optional at the serde level so that a missing field
//! becomes a 400 with the endpoint's own message instead of a generic
//! deserialization rejection. The same records are serialized by
//! [`crate::client::CoachClient`].

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const TOPIC_REQUIRED: &str = "A topic is required.";
pub const QUESTION_AND_ANSWER_REQUIRED: &str = "Question and answer are required";
pub const FOLLOW_UP_FIELDS_REQUIRED: &str = "Both originalQuestion and previousAnswer are required.";

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct GenerateQuestionRequest {
    #[validate(
        required(message = "A topic is required."),
        length(min = 1, message = "A topic is required.")
    )]
    pub topic: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerateQuestionResponse {
    pub question: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct EvaluateAnswerRequest {
    #[validate(
        required(message = "Question and answer are required"),
        length(min = 1, message = "Question and answer are required")
    )]
    pub question: Option<String>,
    #[validate(
        required(message = "Question and answer are required"),
        length(min = 1, message = "Question and answer are required")
    )]
    pub answer: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpRequest {
    #[validate(
        required(message = "Both originalQuestion and previousAnswer are required."),
        length(min = 1, message = "Both originalQuestion and previousAnswer are required.")
    )]
    pub original_question: Option<String>,
    #[validate(
        required(message = "Both originalQuestion and previousAnswer are required."),
        length(min = 1, message = "Both originalQuestion and previousAnswer are required.")
    )]
    pub previous_answer: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpResponse {
    pub follow_up_question: String,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ResumeQuestionsResponse {
    pub questions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_topic_fails_validation() {
        let request: GenerateQuestionRequest = serde_json::from_str("{}").unwrap();
        assert!(request.validate().is_err());

        let request: GenerateQuestionRequest = serde_json::from_str(r#"{"topic":""}"#).unwrap();
        assert!(request.validate().is_err());

        let request: GenerateQuestionRequest = serde_json::from_str(r#"{"topic":"rust"}"#).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_follow_up_uses_camel_case() {
        let request: FollowUpRequest = serde_json::from_str(
            r#"{"originalQuestion":"Q","previousAnswer":"A"}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.original_question.as_deref(), Some("Q"));

        let json = serde_json::to_value(FollowUpResponse { follow_up_question: "Why?".into() }).unwrap();
        assert_eq!(json["followUpQuestion"], "Why?");
    }

    #[test]
    fn test_evaluate_requires_both_fields() {
        let request: EvaluateAnswerRequest = serde_json::from_str(r#"{"question":"Q"}"#).unwrap();
        assert!(request.validate().is_err());
    }
}
