use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;

use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::middleware::auth::CurrentUser;
use crate::models::user::User;
use crate::session::SESSION_COOKIE;
use crate::AppState;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Form(req): Form<RegisterRequest>,
) -> crate::error::Result<Response> {
    let user = state.user_service.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user.id,
            email: user.email,
            username: user.username,
        }),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Form(req): Form<LoginRequest>,
) -> crate::error::Result<Response> {
    let user = state.user_service.login(&req.email, &req.password).await?;
    let token = state.sessions.create(user.id);
    tracing::info!(user_id = %user.id, "User logged in");

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; Max-Age={}",
        SESSION_COOKIE,
        token,
        state.sessions.ttl().as_secs()
    );
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            id: user.id,
            email: user.email,
            username: user.username,
        }),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> crate::error::Result<Response> {
    state.sessions.remove(&current.session_id);
    let cookie = format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({"message": "Logged out"})),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> crate::error::Result<Json<User>> {
    let user = state.user_service.get(current.user_id).await?;
    Ok(Json(user))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(req): Form<UpdateProfileRequest>,
) -> crate::error::Result<Json<User>> {
    let user = state
        .user_service
        .update_profile(current.user_id, req)
        .await?;
    Ok(Json(user))
}
