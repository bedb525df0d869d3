use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;

use crate::dto::quiz_dto::IqSubmitRequest;
use crate::error::Error;
use crate::middleware::auth::CurrentUser;
use crate::services::quiz_engine::{generate_iq_batch, IQ_BATCH_SIZE};
use crate::AppState;

/// Generates a fresh batch of IQ questions and stashes them in the session
/// so the results view can pair them with the submitted answers.
#[axum::debug_handler]
pub async fn get_iq_test(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> crate::error::Result<Response> {
    let questions = generate_iq_batch(state.generator.as_ref(), IQ_BATCH_SIZE).await?;

    let stored = state.sessions.with_entry(&current.session_id, |entry| {
        entry.iq_questions = questions.clone();
    });
    if stored.is_none() {
        return Err(Error::NotAuthenticated("Session expired".to_string()));
    }

    Ok(Json(json!({"questions": questions})).into_response())
}

/// Collects the whole answer batch in one submission and persists one record.
#[axum::debug_handler]
pub async fn submit_iq_test(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<IqSubmitRequest>,
) -> crate::error::Result<Response> {
    if req.answers.is_empty() || req.answers.iter().all(|a| a.trim().is_empty()) {
        return Err(Error::Validation(
            "At least one answer is required".to_string(),
        ));
    }

    let record = state
        .record_service
        .insert_iq_record(current.user_id, &req.answers)
        .await?;

    state.sessions.with_entry(&current.session_id, |entry| {
        entry.iq_answers = req.answers.clone();
    });

    Ok(Json(json!({
        "record_id": record.id,
        "created_at": record.created_at,
    }))
    .into_response())
}

/// The most recent batch from this session, questions paired with the
/// submitted answers.
#[axum::debug_handler]
pub async fn iq_results(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> crate::error::Result<Response> {
    let (questions, answers) = state
        .sessions
        .with_entry(&current.session_id, |entry| {
            (entry.iq_questions.clone(), entry.iq_answers.clone())
        })
        .unwrap_or_default();
    Ok(Json(json!({"questions": questions, "answers": answers})).into_response())
}
