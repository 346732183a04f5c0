use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::utils::{validate_email, validate_password, validate_username};
use crate::access::Role;
use crate::auth::password;
use crate::config;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// POST /auth/register - Create a reader account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if !config::config().security.registration_open {
        return Err(ApiError::forbidden("Registration is closed"));
    }

    let username = payload.username.trim();
    let email = payload.email.trim();
    validate_username(username)?;
    validate_password(&payload.password)?;
    validate_email(email)?;

    let taken: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
    )
    .bind(username)
    .bind(email)
    .fetch_one(&state.pool)
    .await?;
    if taken.0 {
        return Err(ApiError::conflict("Username or email is already taken"));
    }

    let password_hash = password::hash_password(&payload.password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Failed to create account")
    })?;

    // The unique constraints remain the backstop for a concurrent signup
    let (user_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash, role_id)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .bind(Role::Reader as i32)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "userId": user_id })),
    ))
}
