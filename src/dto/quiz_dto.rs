use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TestSetupRequest {
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    pub num_questions: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResponse {
    /// One-based step number, matching the URL.
    pub step: usize,
    pub total: usize,
    pub question: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizReview {
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub explanations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Continue {
        next_step: usize,
    },
    Complete {
        record_id: uuid::Uuid,
        review: QuizReview,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct IqSubmitRequest {
    pub answers: Vec<String>,
}
