use crate::error::{Error, Result};
use crate::models::chat_message::{ChatMessage, SENDER_ASSISTANT, SENDER_USER};
use crate::models::user::User;
use crate::services::generation::{chat_prompt, CompletionProvider};
use sqlx::PgPool;
use uuid::Uuid;

/// Returned to the user when the completion provider is unavailable; the
/// chat flow degrades instead of failing the request.
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't generate a response. Please try again later.";

#[derive(Clone)]
pub struct ChatService {
    pool: PgPool,
}

impl ChatService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Answers one user utterance with a reading level calibrated to the
    /// user's age and grade, then appends both turns to the chat log.
    pub async fn respond(
        &self,
        user: &User,
        input: &str,
        provider: &dyn CompletionProvider,
    ) -> Result<String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::Validation("A message is required".to_string()));
        }

        let (age, grade) = user.study_profile().unwrap_or((0, ""));
        let prompt = chat_prompt(age, grade, input);

        let reply = match provider.complete(&prompt).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(error = ?err, "Chatbot completion failed, degrading to fallback");
                FALLBACK_REPLY.to_string()
            }
        };

        // Two rows per exchange, ordered only by their timestamps.
        sqlx::query(
            r#"
            INSERT INTO chat_messages (user_id, sender, text)
            VALUES ($1, $2, $3), ($1, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(SENDER_USER)
        .bind(input)
        .bind(SENDER_ASSISTANT)
        .bind(&reply)
        .execute(&self.pool)
        .await?;

        Ok(reply)
    }

    pub async fn history(&self, user_id: Uuid) -> Result<Vec<ChatMessage>> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT * FROM chat_messages
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(r#"DELETE FROM chat_messages WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
