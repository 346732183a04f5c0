use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::access::{self, Role};
use crate::database::models::AuthorSubject;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMapping {
    pub author_id: Uuid,
    pub subject_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct TargetId {
    pub id: Uuid,
}

#[derive(Debug, serde::Serialize, FromRow)]
struct MappingRow {
    id: Uuid,
    author_id: Uuid,
    author_name: String,
    subject_id: Uuid,
    subject_name: String,
}

/// GET /mappings/author-subjects - List assignments with names resolved
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let mappings = sqlx::query_as::<_, MappingRow>(
        "SELECT m.id, m.author_id, u.username AS author_name,
                m.subject_id, s.name AS subject_name
         FROM author_subjects m
         JOIN users u ON u.id = m.author_id
         JOIN subjects s ON s.id = m.subject_id
         ORDER BY u.username, s.name",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "mappings": mappings })))
}

/// POST /mappings/author-subjects - Grant an author access to a subject
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateMapping>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let author_exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND role_id = $2)")
            .bind(payload.author_id)
            .bind(Role::Author as i32)
            .fetch_one(&state.pool)
            .await?;
    if !author_exists.0 {
        return Err(ApiError::not_found("Author not found"));
    }

    let subject_exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = $1)")
            .bind(payload.subject_id)
            .fetch_one(&state.pool)
            .await?;
    if !subject_exists.0 {
        return Err(ApiError::not_found("Subject not found"));
    }

    let mapping = sqlx::query_as::<_, AuthorSubject>(
        "INSERT INTO author_subjects (author_id, subject_id) VALUES ($1, $2)
         RETURNING id, author_id, subject_id, created_at",
    )
    .bind(payload.author_id)
    .bind(payload.subject_id)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "mapping": mapping })),
    ))
}

/// DELETE /mappings/author-subjects?id= - Revoke an assignment
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(target): Query<TargetId>,
) -> Result<Json<Value>, ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let result = sqlx::query("DELETE FROM author_subjects WHERE id = $1")
        .bind(target.id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Mapping not found"));
    }

    Ok(Json(json!({ "success": true })))
}
