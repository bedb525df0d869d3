use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const SENDER_USER: &str = "user";
pub const SENDER_ASSISTANT: &str = "assistant";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sender: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
