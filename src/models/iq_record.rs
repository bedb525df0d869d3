use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One completed IQ test: the raw answers submitted in a single batch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IqRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub answers: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
