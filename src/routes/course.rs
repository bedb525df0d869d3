use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;

use crate::middleware::auth::CurrentUser;
use crate::AppState;

#[axum::debug_handler]
pub async fn recommended_courses(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> crate::error::Result<Response> {
    let user = state.user_service.get(current.user_id).await?;
    let courses = state.course_service.recommended_for(&user).await?;
    Ok(Json(json!({"courses": courses})).into_response())
}
