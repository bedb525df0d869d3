use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Course catalog entry, read-only to this service. `min_age` is the lowest
/// age the course is recommended for.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub grade: String,
    pub min_age: i32,
    pub created_at: DateTime<Utc>,
}
