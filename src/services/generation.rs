use crate::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;
use std::time::Duration;

const COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Single-turn text completion. No conversation state is kept between calls,
/// and output is not guaranteed to be distinct across identical prompts.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Completion provider backed by the Groq chat-completions API.
#[derive(Clone)]
pub struct GroqService {
    client: Client,
    api_key: String,
    model: String,
}

impl GroqService {
    pub fn new(api_key: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl CompletionProvider for GroqService {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let res = self
            .client
            .post(COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| Error::UpstreamGeneration(format!("request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::UpstreamGeneration(format!(
                "API error {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res
            .json()
            .await
            .map_err(|e| Error::UpstreamGeneration(format!("unreadable response: {}", e)))?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::UpstreamGeneration("invalid response format".to_string()))
    }
}

pub fn question_prompt(subject: &str, grade: &str) -> String {
    format!(
        "Give ONE MCQ question with 4 options (a, b, c, d) on {} for grade {}. \
         Only provide the question and the options without revealing the correct answer.",
        subject, grade
    )
}

pub fn explanation_prompt(question: &str) -> String {
    format!(
        "Explain why the correct answer for the following question is what it is: {}",
        question
    )
}

pub fn iq_question_prompt() -> String {
    "Give ONE IQ test question with 4 options (a, b, c, d). \
     Only provide the question and the options without revealing the correct answer."
        .to_string()
}

pub fn chat_prompt(age: i32, grade: &str, input: &str) -> String {
    format!(
        "The user is {} years old and in grade {}. \
         Provide a detailed explanation for the following question in a way that is easy \
         for them to understand: {}",
        age, grade, input
    )
}

/// Normalize generated question text: collapse whitespace and strip list
/// numbering the model tends to prepend.
pub fn clean_question(raw: &str) -> String {
    static NUMBERING: OnceLock<Regex> = OnceLock::new();
    let numbering = NUMBERING.get_or_init(|| Regex::new(r"\d\.\s*").expect("valid regex"));

    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    numbering.replace_all(&collapsed, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_question_collapses_whitespace() {
        assert_eq!(
            clean_question("What  is\n\n  2 + 2?"),
            "What is 2 + 2?".to_string()
        );
    }

    #[test]
    fn clean_question_strips_numbering() {
        assert_eq!(
            clean_question("1. What is gravity? a) force b) mass"),
            "What is gravity? a) force b) mass".to_string()
        );
    }

    #[test]
    fn chat_prompt_injects_age_and_grade() {
        let prompt = chat_prompt(12, "7", "why is the sky blue?");
        assert!(prompt.contains("12 years old"));
        assert!(prompt.contains("grade 7"));
        assert!(prompt.ends_with("why is the sky blue?"));
    }
}
