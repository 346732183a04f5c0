use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access;
use crate::database::models::Topic;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub subject_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTopic {
    pub name: String,
    pub subject_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct TargetId {
    pub id: Uuid,
}

/// GET /topics[?subject_id=] - Global topic listing
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let topics = match query.subject_id {
        Some(subject_id) => {
            sqlx::query_as::<_, Topic>(
                "SELECT id, name, subject_id, created_at FROM topics
                 WHERE subject_id = $1 ORDER BY name",
            )
            .bind(subject_id)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Topic>(
                "SELECT id, name, subject_id, created_at FROM topics ORDER BY name",
            )
            .fetch_all(&state.pool)
            .await?
        }
    };

    Ok(Json(json!({ "success": true, "topics": topics })))
}

/// POST /topics - Create a topic under a subject
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateTopic>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Topic name is required"));
    }

    let subject_exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = $1)")
            .bind(payload.subject_id)
            .fetch_one(&state.pool)
            .await?;
    if !subject_exists.0 {
        return Err(ApiError::not_found("Subject not found"));
    }

    let topic = sqlx::query_as::<_, Topic>(
        "INSERT INTO topics (name, subject_id) VALUES ($1, $2)
         RETURNING id, name, subject_id, created_at",
    )
    .bind(name)
    .bind(payload.subject_id)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "topic": topic })),
    ))
}

/// DELETE /topics?id= - Delete a topic (subtopics beneath it cascade)
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(target): Query<TargetId>,
) -> Result<Json<Value>, ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let result = sqlx::query("DELETE FROM topics WHERE id = $1")
        .bind(target.id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Topic not found"));
    }

    Ok(Json(json!({ "success": true })))
}
