use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::dto::quiz_dto::{
    AnswerRequest, QuestionResponse, QuizReview, StepOutcome, TestSetupRequest,
};
use crate::error::Error;
use crate::middleware::auth::CurrentUser;
use crate::services::quiz_engine::{Progress, QuizSession};
use crate::AppState;

fn review_of(quiz: &QuizSession) -> QuizReview {
    QuizReview {
        questions: quiz.questions().to_vec(),
        answers: quiz.answers().to_vec(),
        explanations: quiz.explanations().to_vec(),
    }
}

/// Starts a fresh quiz scratchpad for the caller's session, superseding any
/// quiz already in progress. Age and grade come from the stored profile, not
/// the form.
#[axum::debug_handler]
pub async fn test_setup(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(req): Form<TestSetupRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let user = state.user_service.get(current.user_id).await?;
    let Some((age, grade)) = user.study_profile() else {
        return Err(Error::Validation(
            "Please update your profile with age and grade before starting a test".to_string(),
        ));
    };

    let quiz = QuizSession::new(
        req.subject.clone(),
        grade.to_string(),
        age,
        req.num_questions as usize,
    )?;
    if !state.sessions.set_quiz(&current.session_id, quiz) {
        return Err(Error::NotAuthenticated("Session expired".to_string()));
    }

    tracing::info!(
        user_id = %current.user_id,
        subject = %req.subject,
        num_questions = req.num_questions,
        "Quiz session started"
    );
    Ok(Json(json!({
        "next_step": 1,
        "num_questions": req.num_questions,
    }))
    .into_response())
}

/// Returns the question for a one-based step, generating it on first access.
/// Refreshing the page re-serves the stored text without a generator call.
#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(step): Path<usize>,
) -> crate::error::Result<Json<QuestionResponse>> {
    let mut quiz = state
        .sessions
        .quiz(&current.session_id)
        .ok_or_else(|| Error::BadRequest("No quiz in progress".to_string()))?;
    let index = step
        .checked_sub(1)
        .ok_or_else(|| Error::BadRequest("Question numbers start at 1".to_string()))?;

    let question = quiz
        .get_or_generate_question(index, state.generator.as_ref(), state.max_question_retries)
        .await?;
    let total = quiz.num_questions();
    state.sessions.set_quiz(&current.session_id, quiz);

    Ok(Json(QuestionResponse {
        step,
        total,
        question,
    }))
}

/// Records the answer for the pending question, then either points the
/// caller at the next step or commits the finished record. If the commit
/// fails the scratchpad is left intact so re-posting the final answer
/// retries the write.
#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(step): Path<usize>,
    Form(req): Form<AnswerRequest>,
) -> crate::error::Result<Json<StepOutcome>> {
    let mut quiz = state
        .sessions
        .quiz(&current.session_id)
        .ok_or_else(|| Error::BadRequest("No quiz in progress".to_string()))?;

    // A completed scratchpad means a previous commit failed; skip straight
    // to the retry instead of re-recording the answer.
    if !quiz.is_complete() {
        if step != quiz.answers().len() + 1 {
            return Err(Error::BadRequest(format!(
                "Expected an answer for question {}",
                quiz.answers().len() + 1
            )));
        }
        quiz.submit_answer(&req.answer, state.generator.as_ref())
            .await?;
        state.sessions.set_quiz(&current.session_id, quiz.clone());
    }

    match quiz.advance() {
        Progress::Continue(next) => Ok(Json(StepOutcome::Continue {
            next_step: next + 1,
        })),
        Progress::Complete => {
            let record = state
                .record_service
                .insert_quiz_record(current.user_id, &quiz)
                .await?;
            state.sessions.clear_quiz(&current.session_id);
            Ok(Json(StepOutcome::Complete {
                record_id: record.id,
                review: review_of(&quiz),
            }))
        }
    }
}

/// Review view: the in-progress scratchpad when one exists, otherwise the
/// most recently persisted quiz record.
#[axum::debug_handler]
pub async fn answers(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> crate::error::Result<Response> {
    if let Some(quiz) = state.sessions.quiz(&current.session_id) {
        return Ok(Json(review_of(&quiz)).into_response());
    }

    let latest = state
        .record_service
        .quiz_records_for_user(current.user_id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound("No quiz results yet".to_string()))?;
    Ok(Json(latest).into_response())
}
