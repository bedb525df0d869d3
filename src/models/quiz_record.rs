use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted outcome of one completed quiz session. Immutable after insert;
/// the question/answer/explanation sequences are stored as JSONB arrays of
/// strings, index-aligned with each other.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub grade: String,
    pub age: i32,
    pub questions: serde_json::Value,
    pub answers: serde_json::Value,
    pub explanations: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
