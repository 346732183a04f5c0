use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access;
use crate::database::models::Subject;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSubject {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct TargetId {
    pub id: Uuid,
}

/// GET /subjects - List all subjects
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let subjects = sqlx::query_as::<_, Subject>(
        "SELECT id, name, description, created_by, created_at, updated_at
         FROM subjects ORDER BY name",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "subjects": subjects })))
}

/// POST /subjects - Create a subject
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateSubject>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Subject name is required"));
    }

    let subject = sqlx::query_as::<_, Subject>(
        "INSERT INTO subjects (name, description, created_by)
         VALUES ($1, $2, $3)
         RETURNING id, name, description, created_by, created_at, updated_at",
    )
    .bind(name)
    .bind(payload.description.trim())
    .bind(auth_user.user_id)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "subject": subject })),
    ))
}

/// DELETE /subjects?id= - Delete a subject and everything beneath it
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(target): Query<TargetId>,
) -> Result<Json<Value>, ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
        .bind(target.id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Subject not found"));
    }

    Ok(Json(json!({ "success": true })))
}
