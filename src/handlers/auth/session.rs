use axum::{
    extract::{Extension, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::database::service;
use crate::error::ApiError;
use crate::middleware::{clear_session_cookie, AuthUser};
use crate::state::AppState;

/// GET /auth/me - Current user from the session cookie. The user row is
/// re-fetched so a stale token never shadows the store.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = service::find_user_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Session user no longer exists"))?;

    Ok(Json(json!({ "success": true, "user": user.to_public() })))
}

/// POST /auth/logout - Clear the session cookie. Idempotent; no session
/// required.
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(json!({ "success": true })),
    )
}
