use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;

use crate::dto::chat_dto::{ChatRequest, ChatResponse};
use crate::middleware::auth::CurrentUser;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_response(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ChatRequest>,
) -> crate::error::Result<Json<ChatResponse>> {
    let user = state.user_service.get(current.user_id).await?;
    let reply = state
        .chat_service
        .respond(&user, &req.input, state.generator.as_ref())
        .await?;
    Ok(Json(ChatResponse { response: reply }))
}

#[axum::debug_handler]
pub async fn chat_history(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> crate::error::Result<Response> {
    let messages = state.chat_service.history(current.user_id).await?;
    Ok(Json(json!({"messages": messages})).into_response())
}

#[axum::debug_handler]
pub async fn clear_chat(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> crate::error::Result<Response> {
    let removed = state.chat_service.clear(current.user_id).await?;
    tracing::info!(user_id = %current.user_id, removed, "Chat history cleared");
    Ok(Json(json!({"message": "Chat history cleared successfully"})).into_response())
}
