use crate::error::{Error, Result};
use crate::models::iq_record::IqRecord;
use crate::models::quiz_record::QuizRecord;
use crate::services::quiz_engine::QuizSession;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct RecordService {
    pool: PgPool,
}

impl RecordService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Writes the finished quiz session as one immutable record. Callers keep
    /// the session scratchpad when this fails so the final submission can be
    /// retried.
    pub async fn insert_quiz_record(
        &self,
        user_id: Uuid,
        session: &QuizSession,
    ) -> Result<QuizRecord> {
        if !session.is_complete() {
            return Err(Error::Internal(
                "Attempted to persist an unfinished quiz session".to_string(),
            ));
        }

        let record = sqlx::query_as::<_, QuizRecord>(
            r#"
            INSERT INTO quiz_records (user_id, subject, grade, age, questions, answers, explanations)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(session.subject())
        .bind(session.grade())
        .bind(session.age())
        .bind(serde_json::to_value(session.questions())?)
        .bind(serde_json::to_value(session.answers())?)
        .bind(serde_json::to_value(session.explanations())?)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(record_id = %record.id, user_id = %user_id, "Quiz record persisted");
        Ok(record)
    }

    pub async fn quiz_records_for_user(&self, user_id: Uuid) -> Result<Vec<QuizRecord>> {
        let records = sqlx::query_as::<_, QuizRecord>(
            r#"
            SELECT * FROM quiz_records
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    pub async fn insert_iq_record(&self, user_id: Uuid, answers: &[String]) -> Result<IqRecord> {
        let record = sqlx::query_as::<_, IqRecord>(
            r#"
            INSERT INTO iq_records (user_id, answers)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(serde_json::to_value(answers)?)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(record_id = %record.id, user_id = %user_id, "IQ record persisted");
        Ok(record)
    }

    pub async fn iq_records_for_user(&self, user_id: Uuid) -> Result<Vec<IqRecord>> {
        let records = sqlx::query_as::<_, IqRecord>(
            r#"
            SELECT * FROM iq_records
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}
