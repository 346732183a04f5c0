use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::models::{BookListing, Chapter, Page};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /books - Public catalogue
pub async fn catalogue(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let books = sqlx::query_as::<_, BookListing>(
        "SELECT b.id, b.title, b.author_id, u.username AS author_name,
                b.subject_id, s.name AS subject_name, b.created_at
         FROM books b
         JOIN users u ON u.id = b.author_id
         JOIN subjects s ON s.id = b.subject_id
         ORDER BY b.title",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "books": books })))
}

/// GET /books/:id - Single book detail
pub async fn detail(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let book = sqlx::query_as::<_, BookListing>(
        "SELECT b.id, b.title, b.author_id, u.username AS author_name,
                b.subject_id, s.name AS subject_name, b.created_at
         FROM books b
         JOIN users u ON u.id = b.author_id
         JOIN subjects s ON s.id = b.subject_id
         WHERE b.id = $1",
    )
    .bind(book_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Book not found"))?;

    Ok(Json(json!({ "success": true, "book": book })))
}

/// GET /books/:id/chapters - Reading order for the viewer
pub async fn chapters(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    ensure_book_exists(&state, book_id).await?;

    let chapters = sqlx::query_as::<_, Chapter>(
        "SELECT id, title, book_id, author_id, order_num, created_at, updated_at
         FROM chapters WHERE book_id = $1 ORDER BY order_num, created_at",
    )
    .bind(book_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "chapters": chapters })))
}

/// GET /books/:id/chapters/:chapter_id/pages - Page content, verbatim as
/// the author stored it
pub async fn chapter_pages(
    State(state): State<AppState>,
    Path((book_id, chapter_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    // The chapter must belong to the book in the path
    let chapter_exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM chapters WHERE id = $1 AND book_id = $2)")
            .bind(chapter_id)
            .bind(book_id)
            .fetch_one(&state.pool)
            .await?;
    if !chapter_exists.0 {
        return Err(ApiError::not_found("Chapter not found"));
    }

    let pages = sqlx::query_as::<_, Page>(
        "SELECT id, chapter_id, subtopic_id, content, order_num, created_at, updated_at
         FROM pages WHERE chapter_id = $1 ORDER BY order_num, created_at",
    )
    .bind(chapter_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "pages": pages })))
}

#[derive(Debug, FromRow)]
struct TopicSubtopicRow {
    topic_id: Uuid,
    topic_name: String,
    subtopic_id: Uuid,
    subtopic_name: String,
}

/// GET /books/:id/topics - Topics reachable through the book's subtopics,
/// each with its subtopics grouped beneath it
pub async fn topics(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    ensure_book_exists(&state, book_id).await?;

    let rows = sqlx::query_as::<_, TopicSubtopicRow>(
        "SELECT t.id AS topic_id, t.name AS topic_name,
                st.id AS subtopic_id, st.name AS subtopic_name
         FROM subtopics st
         JOIN topics t ON t.id = st.topic_id
         WHERE st.book_id = $1
         ORDER BY t.name, st.name",
    )
    .bind(book_id)
    .fetch_all(&state.pool)
    .await?;

    // Group subtopics under their topic, preserving query order
    let mut topics: Vec<Value> = Vec::new();
    for row in rows {
        let subtopic = json!({ "id": row.subtopic_id, "name": row.subtopic_name });
        let topic_id = json!(row.topic_id);
        match topics.iter().position(|t| t["id"] == topic_id) {
            Some(i) => {
                if let Some(subtopics) = topics[i]["subtopics"].as_array_mut() {
                    subtopics.push(subtopic);
                }
            }
            None => topics.push(json!({
                "id": row.topic_id,
                "name": row.topic_name,
                "subtopics": [subtopic],
            })),
        }
    }

    Ok(Json(json!({ "success": true, "topics": topics })))
}

/// GET /books/:id/subtopics/:subtopic_id/pages - Pages under a subtopic
pub async fn subtopic_pages(
    State(state): State<AppState>,
    Path((book_id, subtopic_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    let subtopic_exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM subtopics WHERE id = $1 AND book_id = $2)")
            .bind(subtopic_id)
            .bind(book_id)
            .fetch_one(&state.pool)
            .await?;
    if !subtopic_exists.0 {
        return Err(ApiError::not_found("Subtopic not found"));
    }

    let pages = sqlx::query_as::<_, Page>(
        "SELECT id, chapter_id, subtopic_id, content, order_num, created_at, updated_at
         FROM pages WHERE subtopic_id = $1 ORDER BY order_num, created_at",
    )
    .bind(subtopic_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "pages": pages })))
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
