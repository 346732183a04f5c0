use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use crate::access;
use crate::database::models::BookListing;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /admin/books - Global book listing across all authors
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    access::require_superadmin(&state.pool, auth_user.user_id).await?;

    let books = sqlx::query_as::<_, BookListing>(
        "SELECT b.id, b.title, b.author_id, u.username AS author_name,
                b.subject_id, s.name AS subject_name, b.created_at
         FROM books b
         JOIN users u ON u.id = b.author_id
         JOIN subjects s ON s.id = b.subject_id
         ORDER BY b.created_at DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "books": books })))
}
