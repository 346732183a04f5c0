use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Highlight;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

fn default_color() -> String {
    "yellow".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateHighlight {
    pub page_index: i32,
    pub highlighted_text: String,
    #[serde(default = "default_color")]
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct TargetId {
    pub id: Uuid,
}

/// GET /books/:id/highlights - The caller's highlights in this book
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    ensure_book_exists(&state, book_id).await?;

    let highlights = sqlx::query_as::<_, Highlight>(
        "SELECT id, user_id, book_id, page_index, highlighted_text, color, created_at
         FROM highlights WHERE user_id = $1 AND book_id = $2
         ORDER BY page_index, created_at",
    )
    .bind(auth_user.user_id)
    .bind(book_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "highlights": highlights })))
}

/// POST /books/:id/highlights - Save a highlight
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(book_id): Path<Uuid>,
    Json(payload): Json<CreateHighlight>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if payload.highlighted_text.trim().is_empty() {
        return Err(ApiError::validation("Highlighted text is required"));
    }

    ensure_book_exists(&state, book_id).await?;

    let highlight = sqlx::query_as::<_, Highlight>(
        "INSERT INTO highlights (user_id, book_id, page_index, highlighted_text, color)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, user_id, book_id, page_index, highlighted_text, color, created_at",
    )
    .bind(auth_user.user_id)
    .bind(book_id)
    .bind(payload.page_index)
    .bind(&payload.highlighted_text)
    .bind(&payload.color)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "highlight": highlight })),
    ))
}

/// DELETE /books/:id/highlights?id= - Remove one of the caller's highlights
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(book_id): Path<Uuid>,
    Query(target): Query<TargetId>,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query(
        "DELETE FROM highlights WHERE id = $1 AND user_id = $2 AND book_id = $3",
    )
    .bind(target.id)
    .bind(auth_user.user_id)
    .bind(book_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Highlight not found"));
    }

    Ok(Json(json!({ "success": true })))
}

async fn ensure_book_exists(state: &AppState, book_id: Uuid) -> Result<(), ApiError> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
        .bind(book_id)
        .fetch_one(&state.pool)
        .await?;
    if !exists.0 {
        return Err(ApiError::not_found("Book not found"));
    }
    Ok(())
}
