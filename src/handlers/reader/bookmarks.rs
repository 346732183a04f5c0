use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Bookmark;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ToggleBookmark {
    pub page_index: i32,
}

#[derive(Debug, Deserialize)]
pub struct TargetId {
    pub id: Uuid,
}

/// GET /books/:id/bookmarks - The caller's bookmarks in this book
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    ensure_book_exists(&state, book_id).await?;

    let bookmarks = sqlx::query_as::<_, Bookmark>(
        "SELECT id, user_id, book_id, page_index, created_at
         FROM bookmarks WHERE user_id = $1 AND book_id = $2
         ORDER BY page_index",
    )
    .bind(auth_user.user_id)
    .bind(book_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "bookmarks": bookmarks })))
}

/// POST /books/:id/bookmarks - Toggle: bookmarking the same page again
/// removes the existing row instead of creating a second one.
pub async fn toggle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(book_id): Path<Uuid>,
    Json(payload): Json<ToggleBookmark>,
) -> Result<Json<Value>, ApiError> {
    ensure_book_exists(&state, book_id).await?;

    let removed: Option<(Uuid,)> = sqlx::query_as(
        "DELETE FROM bookmarks
         WHERE user_id = $1 AND book_id = $2 AND page_index = $3
         RETURNING id",
    )
    .bind(auth_user.user_id)
    .bind(book_id)
    .bind(payload.page_index)
    .fetch_optional(&state.pool)
    .await?;

    if removed.is_some() {
        return Ok(Json(json!({ "success": true, "bookmarked": false })));
    }

    let bookmark = sqlx::query_as::<_, Bookmark>(
        "INSERT INTO bookmarks (user_id, book_id, page_index)
         VALUES ($1, $2, $3)
         RETURNING id, user_id, book_id, page_index, created_at",
    )
    .bind(auth_user.user_id)
    .bind(book_id)
    .bind(payload.page_index)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "bookmarked": true, "bookmark": bookmark })))
}

/// DELETE /books/:id/bookmarks?id= - Remove one of the caller's bookmarks
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(book_id): Path<Uuid>,
    Query(target): Query<TargetId>,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query(
        "DELETE FROM bookmarks WHERE id = $1 AND user_id = $2 AND book_id = $3",
    )
    .bind(target.id)
    .bind(auth_user.user_id)
    .bind(book_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Bookmark not found"));
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
