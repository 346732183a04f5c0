use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access;
use crate::database::models::Page;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub chapter_id: Option<Uuid>,
    pub subtopic_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePage {
    pub chapter_id: Option<Uuid>,
    pub subtopic_id: Option<Uuid>,
    pub content: String,
    #[serde(default)]
    pub order_num: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePage {
    pub id: Uuid,
    pub content: String,
    pub order_num: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct TargetId {
    pub id: Uuid,
}

/// GET /author/pages?chapter_id=|subtopic_id= - Pages under one owned parent
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    let pages = match (query.chapter_id, query.subtopic_id) {
        (Some(chapter_id), None) => {
            access::chapter_access(&state.pool, chapter_id, auth_user.user_id)
                .await?
                .into_result("Chapter")?;
            fetch_pages(&state, "chapter_id", chapter_id).await?
        }
        (None, Some(subtopic_id)) => {
            access::subtopic_access(&state.pool, subtopic_id, auth_user.user_id)
                .await?
                .into_result("Subtopic")?;
            fetch_pages(&state, "subtopic_id", subtopic_id).await?
        }
        _ => {
            return Err(ApiError::validation(
                "Exactly one of chapter_id or subtopic_id is required",
            ))
        }
    };

    Ok(Json(json!({ "success": true, "pages": pages })))
}

async fn fetch_pages(state: &AppState, parent_col: &str, parent_id: Uuid) -> Result<Vec<Page>, ApiError> {
    // parent_col is one of two fixed identifiers, never user input
    let sql = format!(
        "SELECT id, chapter_id, subtopic_id, content, order_num, created_at, updated_at
         FROM pages WHERE {} = $1 ORDER BY order_num, created_at",
        parent_col
    );
    Ok(sqlx::query_as::<_, Page>(&sql)
        .bind(parent_id)
        .fetch_all(&state.pool)
        .await?)
}

/// POST /author/pages - Add a page under an owned chapter or subtopic. The
/// immediate parent's stored owner decides; the chain above it is not
/// re-walked.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreatePage>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;

    match (payload.chapter_id, payload.subtopic_id) {
        (Some(chapter_id), None) => {
            access::chapter_access(&state.pool, chapter_id, auth_user.user_id)
                .await?
                .into_result("Chapter")?;
        }
        (None, Some(subtopic_id)) => {
            access::subtopic_access(&state.pool, subtopic_id, auth_user.user_id)
                .await?
                .into_result("Subtopic")?;
        }
        _ => {
            return Err(ApiError::validation(
                "Exactly one of chapter_id or subtopic_id is required",
            ))
        }
    }

    let page = sqlx::query_as::<_, Page>(
        "INSERT INTO pages (chapter_id, subtopic_id, content, order_num)
         VALUES ($1, $2, $3, $4)
         RETURNING id, chapter_id, subtopic_id, content, order_num, created_at, updated_at",
    )
    .bind(payload.chapter_id)
    .bind(payload.subtopic_id)
    .bind(&payload.content)
    .bind(payload.order_num)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "page": page })),
    ))
}

/// PUT /author/pages - Replace a page's content
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<UpdatePage>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;
    access::page_access(&state.pool, payload.id, auth_user.user_id)
        .await?
        .into_result("Page")?;

    let result = sqlx::query(
        "UPDATE pages
         SET content = $1, order_num = COALESCE($2, order_num), updated_at = now()
         WHERE id = $3",
    )
    .bind(&payload.content)
    .bind(payload.order_num)
    .bind(payload.id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Page not found"));
    }

    Ok(Json(json!({ "success": true })))
}

/// DELETE /author/pages?id= - Delete a page under an owned parent
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(target): Query<TargetId>,
) -> Result<Json<Value>, ApiError> {
    access::require_author(&state.pool, auth_user.user_id).await?;
    access::page_access(&state.pool, target.id, auth_user.user_id)
        .await?
        .into_result("Page")?;

    let result = sqlx::query("DELETE FROM pages WHERE id = $1")
        .bind(target.id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Page not found"));
    }

    Ok(Json(json!({ "success": true })))
}
