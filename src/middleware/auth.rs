use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::session::SESSION_COOKIE;
use crate::AppState;

/// Identity resolved from the session cookie, injected into request
/// extensions for authenticated routes.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session_id: String,
    pub user_id: Uuid,
}

/// Extracts the session cookie value from a `Cookie` header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = session_token(req.headers()) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"not_authenticated"})),
        )
            .into_response();
    };

    let Some(user_id) = state.sessions.resolve(&token) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"not_authenticated"})),
        )
            .into_response();
    };

    req.extensions_mut().insert(CurrentUser {
        session_id: token,
        user_id,
    });
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn session_token_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            format!("theme=dark; {}=abc123; lang=en", SESSION_COOKIE)
                .parse()
                .unwrap(),
        );
        assert_eq!(session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn missing_cookie_header_yields_none() {
        assert_eq!(session_token(&HeaderMap::new()), None);
    }
}
