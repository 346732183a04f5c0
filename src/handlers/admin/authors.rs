use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access::{self, Role};
use crate::auth::password;
use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::auth::utils::{validate_email, validate_username};
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAuthor {
    pub username: String,
    pub email: String,
    /// Subjects assigned together with the account
    #[serde(default)]
    pub subject_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct TargetId {
    pub id: Uuid,
}

/// GET /authors - List author accounts
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let authors = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, role_id, created_at, updated_at
         FROM users WHERE role_id = $1 ORDER BY username",
    )
    .bind(Role::Author as i32)
    .fetch_all(&state.pool)
    .await?;

    let authors: Vec<Value> = authors.iter().map(User::to_public).collect();
    Ok(Json(json!({ "success": true, "authors": authors })))
}

/// POST /authors - Provision an author account with a generated credential.
/// The credential is handed off by mail; when delivery fails the account
/// still stands and the credential is returned in-band with a warning so an
/// operator can pass it on manually.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateAuthor>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let username = payload.username.trim();
    let email = payload.email.trim();
    validate_username(username)?;
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

    let temp_password = password::generate_temp_password();
    let password_hash = password::hash_password(&temp_password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Failed to create author")
    })?;

    // Account and initial assignments commit together or not at all
    let mut tx = state.pool.begin().await?;

    let author = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash, role_id)
         VALUES ($1, $2, $3, $4)
         RETURNING id, username, email, password_hash, role_id, created_at, updated_at",
    )
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .bind(Role::Author as i32)
    .fetch_one(&mut *tx)
    .await?;

    for subject_id in &payload.subject_ids {
        let subject_exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = $1)")
                .bind(subject_id)
                .fetch_one(&mut *tx)
                .await?;
        if !subject_exists.0 {
            return Err(ApiError::not_found("Subject not found"));
        }
        sqlx::query("INSERT INTO author_subjects (author_id, subject_id) VALUES ($1, $2)")
            .bind(author.id)
            .bind(subject_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let body = match state.mailer.send_credentials(email, username, &temp_password).await {
        Ok(()) => json!({ "success": true, "author": author.to_public() }),
        Err(e) => {
            tracing::warn!("Credential mail for author '{}' failed: {}", username, e);
            json!({
                "success": true,
                "author": author.to_public(),
                "warning": "Account created but the credential email could not be sent",
                "tempPassword": temp_password,
            })
        }
    };

    Ok((StatusCode::CREATED, Json(body)))
}

/// DELETE /authors?id= - Delete an author account; owned books and the
/// content beneath them cascade.
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(target): Query<TargetId>,
) -> Result<Json<Value>, ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let result = sqlx::query("DELETE FROM users WHERE id = $1 AND role_id = $2")
        .bind(target.id)
        .bind(Role::Author as i32)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Author not found"));
    }

    Ok(Json(json!({ "success": true })))
}
