use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;

use crate::middleware::auth::CurrentUser;
use crate::AppState;

/// The caller's completed quizzes and IQ tests, newest first.
#[axum::debug_handler]
pub async fn stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> crate::error::Result<Response> {
    let tests = state
        .record_service
        .quiz_records_for_user(current.user_id)
        .await?;
    let iq_tests = state
        .record_service
        .iq_records_for_user(current.user_id)
        .await?;

    Ok(Json(json!({
        "tests": tests,
        "iq_tests": iq_tests,
    }))
    .into_response())
}
