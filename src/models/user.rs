use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Age and grade as required by quiz setup and course filtering.
    /// `None` when the profile is incomplete.
    pub fn study_profile(&self) -> Option<(i32, &str)> {
        match (self.age, self.grade.as_deref()) {
            (Some(age), Some(grade)) if !grade.is_empty() => Some((age, grade)),
            _ => None,
        }
    }
}
