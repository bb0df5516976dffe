use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::parsing::{Evaluation, MAX_SCORE, MIN_SCORE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub score: i32,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInterviewSession {
    pub question: String,
    pub answer: String,
    pub score: i32,
    pub feedback: String,
}

impl NewInterviewSession {
    pub fn new(question: String, answer: String, score: i32, feedback: String) -> Self {
        Self {
            question,
            answer,
            score: score.clamp(MIN_SCORE as i32, MAX_SCORE as i32),
            feedback,
        }
    }

    pub fn from_evaluation(question: String, answer: String, evaluation: &Evaluation) -> Self {
        Self::new(question, answer, evaluation.score as i32, evaluation.feedback.clone())
    }

    pub(crate) fn into_session(self, created_at: DateTime<Utc>) -> InterviewSession {
        InterviewSession {
            id: Uuid::new_v4(),
            question: self.question,
            answer: self.answer,
            score: self.score,
            feedback: self.feedback,
            created_at,
        }
    }
}
