use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access;
use crate::database::models::Chapter;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub book_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateChapter {
    pub book_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub order_num: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateChapter {
    pub id: Uuid,
    pub title: String,
    pub order_num: i32,
}

#[derive(Debug, Deserialize)]
pub struct TargetId {
    pub id: Uuid,
}

/// GET /author/chapters?book_id= - Chapters of an owned book
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;
    access::book_access(&state.pool, query.book_id, auth_user.user_id)
        .await?
        .into_result("Book")?;

    let chapters = sqlx::query_as::<_, Chapter>(
        "SELECT id, title, book_id, author_id, order_num, created_at, updated_at
         FROM chapters WHERE book_id = $1 ORDER BY order_num, created_at",
    )
    .bind(query.book_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "chapters": chapters })))
}

/// POST /author/chapters - Add a chapter to an owned book. The owner column
/// is denormalized from the verified book.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateChapter>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Chapter title is required"));
    }

    access::book_access(&state.pool, payload.book_id, auth_user.user_id)
        .await?
        .into_result("Book")?;

    let chapter = sqlx::query_as::<_, Chapter>(
        "INSERT INTO chapters (title, book_id, author_id, order_num)
         VALUES ($1, $2, $3, $4)
         RETURNING id, title, book_id, author_id, order_num, created_at, updated_at",
    )
    .bind(title)
    .bind(payload.book_id)
    .bind(auth_user.user_id)
    .bind(payload.order_num)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "chapter": chapter })),
    ))
}

/// PUT /author/chapters - Full-row update, owner-filtered in the statement
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<UpdateChapter>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Chapter title is required"));
    }

    let result = sqlx::query(
        "UPDATE chapters SET title = $1, order_num = $2, updated_at = now()
         WHERE id = $3 AND author_id = $4",
    )
    .bind(title)
    .bind(payload.order_num)
    .bind(payload.id)
    .bind(auth_user.user_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Chapter not found"));
    }

    Ok(Json(json!({ "success": true })))
}

/// DELETE /author/chapters?id= - Delete an owned chapter; its pages cascade
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(target): Query<TargetId>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    let result = sqlx::query("DELETE FROM chapters WHERE id = $1 AND author_id = $2")
        .bind(target.id)
        .bind(auth_user.user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Chapter not found"));
    }

    Ok(Json(json!({ "success": true })))
}
