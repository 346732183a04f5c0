use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access;
use crate::database::models::Book;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub subject_id: Uuid,
    /// Topic names created together with the book under its subject
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBook {
    pub id: Uuid,
    pub title: String,
    pub subject_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct TargetId {
    pub id: Uuid,
}

/// GET /author/books - The caller's own books
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    let books = sqlx::query_as::<_, Book>(
        "SELECT id, title, author_id, subject_id, created_at, updated_at
         FROM books WHERE author_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth_user.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "books": books })))
}

/// POST /author/books - Create a book, plus its initial topics, in one
/// transaction. An unassigned subject answers like a missing one.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateBook>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Book title is required"));
    }

    if !access::subject_assigned(&state.pool, auth_user.user_id, payload.subject_id).await? {
        return Err(ApiError::not_found("Subject not found"));
    }

    let mut tx = state.pool.begin().await?;

    let book = sqlx::query_as::<_, Book>(
        "INSERT INTO books (title, author_id, subject_id)
         VALUES ($1, $2, $3)
         RETURNING id, title, author_id, subject_id, created_at, updated_at",
    )
    .bind(title)
    .bind(auth_user.user_id)
    .bind(payload.subject_id)
    .fetch_one(&mut *tx)
    .await?;

    for name in &payload.topics {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        sqlx::query("INSERT INTO topics (name, subject_id) VALUES ($1, $2)")
            .bind(name)
            .bind(payload.subject_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "book": book })),
    ))
}

/// PUT /author/books - Full-row update, owner-filtered in the statement
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<UpdateBook>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Book title is required"));
    }

    if let Some(subject_id) = payload.subject_id {
        if !access::subject_assigned(&state.pool, auth_user.user_id, subject_id).await? {
            return Err(ApiError::not_found("Subject not found"));
        }
    }

    let result = sqlx::query(
        "UPDATE books
         SET title = $1, subject_id = COALESCE($2, subject_id), updated_at = now()
         WHERE id = $3 AND author_id = $4",
    )
    .bind(title)
    .bind(payload.subject_id)
    .bind(payload.id)
    .bind(auth_user.user_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Book not found"));
    }

    Ok(Json(json!({ "success": true })))
}

/// DELETE /author/books?id= - Delete an owned book; chapters, subtopics and
/// pages beneath it cascade in the store.
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(target): Query<TargetId>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    let result = sqlx::query("DELETE FROM books WHERE id = $1 AND author_id = $2")
        .bind(target.id)
        .bind(auth_user.user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Book not found"));
    }

    Ok(Json(json!({ "success": true })))
}
