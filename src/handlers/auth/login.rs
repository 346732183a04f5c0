use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::access::Role;
use crate::auth::{self, password, Claims};
use crate::database::service;
use crate::error::ApiError;
use crate::middleware::session_cookie;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Verify credentials and establish a session.
/// Sets the http-only session cookie and returns the role's landing page.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    // A wrong email and a wrong password produce the same answer
    let user = service::find_user_by_email(&state.pool, email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !password::verify_password(&user.password_hash, &payload.password) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let role = Role::from_i32(user.role_id).ok_or_else(|| {
        tracing::error!("User {} has unknown role id {}", user.id, user.role_id);
        ApiError::internal_server_error("Account is misconfigured")
    })?;

    let claims = Claims::new(user.id, user.username.clone(), user.email.clone(), role);
    let token = auth::issue_token(&claims).map_err(|e| {
        tracing::error!("Failed to issue session token: {}", e);
        ApiError::internal_server_error("Failed to establish session")
    })?;

    Ok((
        [(header::SET_COOKIE, session_cookie(&token))],
        Json(json!({
            "success": true,
            "user": user.to_public(),
            "redirectUrl": role.home_path(),
        })),
    ))
}
