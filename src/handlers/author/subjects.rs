use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access;
use crate::database::models::{Subject, Topic};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TopicsQuery {
    pub subject_id: Uuid,
}

/// GET /author/subjects - Subjects the caller is assigned to. Unassigned
/// subjects are simply not visible to the author.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    let subjects = sqlx::query_as::<_, Subject>(
        "SELECT DISTINCT s.id, s.name, s.description, s.created_by, s.created_at, s.updated_at
         FROM subjects s
         JOIN author_subjects m ON m.subject_id = s.id
         WHERE m.author_id = $1
         ORDER BY s.name",
    )
    .bind(auth_user.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "subjects": subjects })))
}

/// GET /author/topics?subject_id= - Topics under an assigned subject, for
/// placing subtopics
pub async fn topics(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TopicsQuery>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    if !access::subject_assigned(&state.pool, auth_user.user_id, query.subject_id).await? {
        return Err(ApiError::not_found("Subject not found"));
    }

    let topics = sqlx::query_as::<_, Topic>(
        "SELECT id, name, subject_id, created_at FROM topics
         WHERE subject_id = $1 ORDER BY name",
    )
    .bind(query.subject_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "topics": topics })))
}
