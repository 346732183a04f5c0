use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Highlight {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub page_index: i32,
    pub highlighted_text: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}
