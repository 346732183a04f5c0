use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access;
use crate::database::models::Subtopic;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub book_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubtopic {
    pub name: String,
    pub topic_id: Uuid,
    pub book_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubtopic {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TargetId {
    pub id: Uuid,
}

/// GET /author/subtopics?book_id= - Subtopics of an owned book
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;
    access::book_access(&state.pool, query.book_id, auth_user.user_id)
        .await?
        .into_result("Book")?;

    let subtopics = sqlx::query_as::<_, Subtopic>(
        "SELECT id, name, topic_id, book_id, author_id, created_at, updated_at
         FROM subtopics WHERE book_id = $1 ORDER BY name",
    )
    .bind(query.book_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "subtopics": subtopics })))
}

/// POST /author/subtopics - Add a subtopic under a topic within an owned
/// book. Only the book (the immediate owner link) is verified; the topic
/// needs to exist but carries no owner of its own.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateSubtopic>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Subtopic name is required"));
    }

    access::book_access(&state.pool, payload.book_id, auth_user.user_id)
        .await?
        .into_result("Book")?;

    let topic_exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM topics WHERE id = $1)")
            .bind(payload.topic_id)
            .fetch_one(&state.pool)
            .await?;
    if !topic_exists.0 {
        return Err(ApiError::not_found("Topic not found"));
    }

    let subtopic = sqlx::query_as::<_, Subtopic>(
        "INSERT INTO subtopics (name, topic_id, book_id, author_id)
         VALUES ($1, $2, $3, $4)
         RETURNING id, name, topic_id, book_id, author_id, created_at, updated_at",
    )
    .bind(name)
    .bind(payload.topic_id)
    .bind(payload.book_id)
    .bind(auth_user.user_id)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "subtopic": subtopic })),
    ))
}

/// PUT /author/subtopics - Rename, owner-filtered in the statement
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<UpdateSubtopic>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Subtopic name is required"));
    }

    let result = sqlx::query(
        "UPDATE subtopics SET name = $1, updated_at = now()
         WHERE id = $2 AND author_id = $3",
    )
    .bind(name)
    .bind(payload.id)
    .bind(auth_user.user_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Subtopic not found"));
    }

    Ok(Json(json!({ "success": true })))
}

/// DELETE /author/subtopics?id= - Delete an owned subtopic; pages cascade
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(target): Query<TargetId>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    let result = sqlx::query("DELETE FROM subtopics WHERE id = $1 AND author_id = $2")
        .bind(target.id)
        .bind(auth_user.user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Subtopic not found"));
    }

    Ok(Json(json!({ "success": true })))
}
