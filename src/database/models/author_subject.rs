use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Assignment row granting an author write access under a subject.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthorSubject {
    pub id: Uuid,
    pub author_id: Uuid,
    pub subject_id: Uuid,
    pub created_at: DateTime<Utc>,
}
