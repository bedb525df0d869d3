use crate::error::{Error, Result};
use crate::services::generation::{
    clean_question, explanation_prompt, iq_question_prompt, question_prompt, CompletionProvider,
};
use serde::{Deserialize, Serialize};

/// Stored when explanation generation fails; the quiz flow degrades instead
/// of aborting a submitted answer.
pub const FALLBACK_EXPLANATION: &str =
    "Failed to generate an explanation for this question. Please try again later.";

pub const IQ_BATCH_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// More questions remain; the contained value is the next zero-based step.
    Continue(usize),
    Complete,
}

/// Per-user quiz scratchpad. Owned by the session store and passed explicitly
/// into handlers; never shared between users.
///
/// Invariant: `answers.len() == explanations.len() <= questions.len() <=
/// num_questions`, and the stored questions are duplicate-free by exact text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    subject: String,
    grade: String,
    age: i32,
    num_questions: usize,
    questions: Vec<String>,
    answers: Vec<String>,
    explanations: Vec<String>,
}

impl QuizSession {
    pub fn new(subject: String, grade: String, age: i32, num_questions: usize) -> Result<Self> {
        if num_questions == 0 {
            return Err(Error::Validation(
                "A quiz needs at least one question".to_string(),
            ));
        }
        Ok(Self {
            subject,
            grade,
            age,
            num_questions,
            questions: Vec::new(),
            answers: Vec::new(),
            explanations: Vec::new(),
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn grade(&self) -> &str {
        &self.grade
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn num_questions(&self) -> usize {
        self.num_questions
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn explanations(&self) -> &[String] {
        &self.explanations
    }

    pub fn is_complete(&self) -> bool {
        self.answers.len() == self.num_questions
    }

    /// Returns the stored question for `step` if it was already generated
    /// (idempotent re-render on page refresh), otherwise asks the provider
    /// for a new one. Generated text that exactly duplicates an earlier
    /// question in this session is rejected and retried up to `max_retries`
    /// times; after the cap the last candidate is disambiguated with a
    /// deterministic suffix rather than looping forever.
    pub async fn get_or_generate_question(
        &mut self,
        step: usize,
        provider: &dyn CompletionProvider,
        max_retries: usize,
    ) -> Result<String> {
        if step >= self.num_questions {
            return Err(Error::BadRequest(format!(
                "Question {} is out of range for a {}-question quiz",
                step + 1,
                self.num_questions
            )));
        }
        if let Some(existing) = self.questions.get(step) {
            return Ok(existing.clone());
        }
        if step != self.questions.len() {
            return Err(Error::BadRequest(
                "Questions must be taken in order".to_string(),
            ));
        }

        let prompt = question_prompt(&self.subject, &self.grade);
        let mut candidate = String::new();
        for attempt in 0..max_retries.max(1) {
            candidate = clean_question(&provider.complete(&prompt).await?);
            if !self.questions.iter().any(|q| q == &candidate) {
                self.questions.push(candidate.clone());
                return Ok(candidate);
            }
            tracing::warn!(
                attempt = attempt + 1,
                "Generator repeated an existing question, retrying"
            );
        }

        // Retry cap reached with only duplicates produced.
        let fallback = format!("{} (variant {})", candidate, self.questions.len() + 1);
        tracing::warn!("Retry cap reached, storing disambiguated question text");
        self.questions.push(fallback.clone());
        Ok(fallback)
    }

    /// Records an answer for the pending question and synchronously fetches
    /// its explanation. A failed explanation call degrades to a placeholder
    /// so the answer is never lost; both sequences always grow together.
    pub async fn submit_answer(
        &mut self,
        answer: &str,
        provider: &dyn CompletionProvider,
    ) -> Result<()> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(Error::Validation("Please select an answer".to_string()));
        }
        if self.answers.len() >= self.questions.len() {
            return Err(Error::BadRequest(
                "There is no pending question to answer".to_string(),
            ));
        }

        let current = self.questions[self.answers.len()].clone();
        let explanation = match provider.complete(&explanation_prompt(&current)).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(error = ?err, "Explanation generation failed, storing placeholder");
                FALLBACK_EXPLANATION.to_string()
            }
        };

        self.answers.push(answer.to_string());
        self.explanations.push(explanation);
        Ok(())
    }

    pub fn advance(&self) -> Progress {
        if self.answers.len() < self.num_questions {
            Progress::Continue(self.answers.len())
        } else {
            Progress::Complete
        }
    }
}

/// Batch generation for the IQ flow: a fixed number of independent questions,
/// fetched up front with no uniqueness constraint across them.
pub async fn generate_iq_batch(
    provider: &dyn CompletionProvider,
    count: usize,
) -> Result<Vec<String>> {
    let mut questions = Vec::with_capacity(count);
    for _ in 0..count {
        questions.push(clean_question(&provider.complete(&iq_question_prompt()).await?));
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted provider: pops responses in order and counts calls.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<std::result::Result<String, String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<std::result::Result<&str, &str>>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(String::from).map_err(String::from))
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(msg)) => Err(Error::UpstreamGeneration(msg)),
                None => panic!("provider called more times than scripted"),
            }
        }
    }

    fn session(n: usize) -> QuizSession {
        QuizSession::new("math".into(), "5".into(), 11, n).unwrap()
    }

    #[test]
    fn zero_questions_rejected() {
        assert!(QuizSession::new("math".into(), "5".into(), 11, 0).is_err());
    }

    #[tokio::test]
    async fn refetch_is_idempotent() {
        let provider = ScriptedProvider::new(vec![Ok("What is 2+2?")]);
        let mut quiz = session(3);

        let first = quiz.get_or_generate_question(0, &provider, 5).await.unwrap();
        let second = quiz.get_or_generate_question(0, &provider, 5).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1, "second fetch must not call the provider");
    }

    #[tokio::test]
    async fn duplicate_text_retried_until_distinct() {
        let provider = ScriptedProvider::new(vec![
            Ok("Question A"),
            Ok("Explanation A"),
            Ok("Question A"),
            Ok("Question A"),
            Ok("Question B"),
        ]);
        let mut quiz = session(2);

        quiz.get_or_generate_question(0, &provider, 5).await.unwrap();
        quiz.submit_answer("a", &provider).await.unwrap();
        let q2 = quiz.get_or_generate_question(1, &provider, 5).await.unwrap();

        assert_eq!(q2, "Question B");
        assert_eq!(quiz.questions().len(), 2);
        assert_ne!(quiz.questions()[0], quiz.questions()[1]);
    }

    #[tokio::test]
    async fn retry_cap_falls_back_to_suffixed_text() {
        let provider = ScriptedProvider::new(vec![
            Ok("Question A"),
            Ok("Explanation A"),
            Ok("Question A"),
            Ok("Question A"),
            Ok("Question A"),
        ]);
        let mut quiz = session(2);

        quiz.get_or_generate_question(0, &provider, 3).await.unwrap();
        quiz.submit_answer("a", &provider).await.unwrap();
        let q2 = quiz.get_or_generate_question(1, &provider, 3).await.unwrap();

        assert_eq!(q2, "Question A (variant 2)");
        assert_ne!(quiz.questions()[0], quiz.questions()[1]);
    }

    #[tokio::test]
    async fn empty_answer_rejected_without_side_effects() {
        let provider = ScriptedProvider::new(vec![Ok("Question A")]);
        let mut quiz = session(1);
        quiz.get_or_generate_question(0, &provider, 5).await.unwrap();

        let err = quiz.submit_answer("   ", &provider).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(quiz.answers().is_empty());
        assert!(quiz.explanations().is_empty());
    }

    #[tokio::test]
    async fn answer_without_pending_question_rejected() {
        let provider = ScriptedProvider::new(vec![]);
        let mut quiz = session(1);
        let err = quiz.submit_answer("a", &provider).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn failed_explanation_degrades_to_placeholder() {
        let provider = ScriptedProvider::new(vec![Ok("Question A"), Err("api down")]);
        let mut quiz = session(1);

        quiz.get_or_generate_question(0, &provider, 5).await.unwrap();
        quiz.submit_answer("b", &provider).await.unwrap();

        assert_eq!(quiz.answers().len(), 1);
        assert_eq!(quiz.explanations()[0], FALLBACK_EXPLANATION);
    }

    #[tokio::test]
    async fn three_step_quiz_completes_with_aligned_sequences() {
        let provider = ScriptedProvider::new(vec![
            Ok("Q1"),
            Ok("E1"),
            Ok("Q2"),
            Ok("E2"),
            Ok("Q3"),
            Ok("E3"),
        ]);
        let mut quiz = session(3);

        for step in 0..3 {
            assert_eq!(quiz.advance(), Progress::Continue(step));
            quiz.get_or_generate_question(step, &provider, 5).await.unwrap();
            quiz.submit_answer(&format!("answer {}", step), &provider)
                .await
                .unwrap();
            assert_eq!(quiz.answers().len(), quiz.explanations().len());
            assert!(quiz.answers().len() <= quiz.questions().len());
        }

        assert_eq!(quiz.advance(), Progress::Complete);
        assert!(quiz.is_complete());
        assert_eq!(quiz.questions(), ["Q1", "Q2", "Q3"]);
        assert_eq!(quiz.answers(), ["answer 0", "answer 1", "answer 2"]);
        assert_eq!(quiz.explanations(), ["E1", "E2", "E3"]);
    }

    #[tokio::test]
    async fn question_generation_error_is_surfaced() {
        let provider = ScriptedProvider::new(vec![Err("timeout")]);
        let mut quiz = session(1);
        let err = quiz.get_or_generate_question(0, &provider, 5).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamGeneration(_)));
        assert!(quiz.questions().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_step_rejected() {
        let provider = ScriptedProvider::new(vec![]);
        let mut quiz = session(2);
        assert!(quiz.get_or_generate_question(2, &provider, 5).await.is_err());
        assert!(quiz.get_or_generate_question(1, &provider, 5).await.is_err());
    }

    #[tokio::test]
    async fn iq_batch_has_fixed_size() {
        let provider = ScriptedProvider::new(vec![
            Ok("IQ 1"),
            Ok("IQ 2"),
            Ok("IQ 3"),
            Ok("IQ 4"),
            Ok("IQ 5"),
        ]);
        let batch = generate_iq_batch(&provider, IQ_BATCH_SIZE).await.unwrap();
        assert_eq!(batch.len(), IQ_BATCH_SIZE);
        assert_eq!(provider.calls(), IQ_BATCH_SIZE);
    }
}
