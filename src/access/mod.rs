//! Access control: role checks and ownership checks for the content
//! hierarchy. Every mutation resolves the target's immediate parent row and
//! compares its stored owner column against the caller before touching the
//! store; nothing is cached between requests.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

/// Fixed role enumeration. The integer ids match the seeded `roles` table
/// and are the canonical representation everywhere (claims, rows, checks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Role {
    Superadmin = 1,
    Author = 2,
    Reader = 3,
}

impl Role {
    pub fn from_i32(value: i32) -> Option<Role> {
        match value {
            1 => Some(Role::Superadmin),
            2 => Some(Role::Author),
            3 => Some(Role::Reader),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Author => "author",
            Role::Reader => "reader",
        }
    }

    /// Landing page for the role after login; also used by the route guard.
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Superadmin => "/dashboard",
            Role::Author => "/author",
            Role::Reader => "/",
        }
    }
}

/// Tagged outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Forbidden,
    NotFound,
}

impl Access {
    /// Collapse into the response policy: a row that exists but is not
    /// yours answers exactly like a row that does not exist, so callers
    /// cannot probe for existence.
    pub fn into_result(self, entity: &str) -> Result<(), ApiError> {
        match self {
            Access::Allowed => Ok(()),
            Access::Forbidden | Access::NotFound => {
                Err(ApiError::not_found(format!("{} not found", entity)))
            }
        }
    }
}

/// Fetch the caller's current role from the store. Privileged paths trust
/// this over the role baked into the token.
pub async fn live_role(pool: &PgPool, user_id: Uuid) -> Result<Option<Role>, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT role_id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.and_then(|(role_id,)| Role::from_i32(role_id)))
}

/// Require the caller's live role to be superadmin.
pub async fn require_superadmin(pool: &PgPool, user_id: Uuid) -> Result<(), ApiError> {
    require_role(pool, user_id, Role::Superadmin).await
}

/// Require the caller's live role to be author.
pub async fn require_author(pool: &PgPool, user_id: Uuid) -> Result<(), ApiError> {
    require_role(pool, user_id, Role::Author).await
}

async fn require_role(pool: &PgPool, user_id: Uuid, role: Role) -> Result<(), ApiError> {
    match live_role(pool, user_id).await? {
        Some(current) if current == role => Ok(()),
        Some(_) | None => Err(ApiError::unauthorized(format!(
            "{} access required",
            role.name()
        ))),
    }
}

/// True when an assignment row joins the author and subject. Duplicate
/// grants are tolerated, so this is an EXISTS rather than a row fetch.
pub async fn subject_assigned(
    pool: &PgPool,
    author_id: Uuid,
    subject_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM author_subjects WHERE author_id = $1 AND subject_id = $2)",
    )
    .bind(author_id)
    .bind(subject_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Compare a book's owner against the caller.
pub async fn book_access(
    pool: &PgPool,
    book_id: Uuid,
    caller_id: Uuid,
) -> Result<Access, sqlx::Error> {
    owner_access(pool, "SELECT author_id FROM books WHERE id = $1", book_id, caller_id).await
}

/// Compare a chapter's denormalized owner against the caller. The chain is
/// not re-walked past the immediate parent; the stored owner column is
/// authoritative.
pub async fn chapter_access(
    pool: &PgPool,
    chapter_id: Uuid,
    caller_id: Uuid,
) -> Result<Access, sqlx::Error> {
    owner_access(pool, "SELECT author_id FROM chapters WHERE id = $1", chapter_id, caller_id).await
}

/// Compare a subtopic's denormalized owner against the caller.
pub async fn subtopic_access(
    pool: &PgPool,
    subtopic_id: Uuid,
    caller_id: Uuid,
) -> Result<Access, sqlx::Error> {
    owner_access(pool, "SELECT author_id FROM subtopics WHERE id = $1", subtopic_id, caller_id)
        .await
}

/// Resolve a page's immediate parent (chapter or subtopic) and compare that
/// parent's owner against the caller.
pub async fn page_access(
    pool: &PgPool,
    page_id: Uuid,
    caller_id: Uuid,
) -> Result<Access, sqlx::Error> {
    let row: Option<(Option<Uuid>, Option<Uuid>)> =
        sqlx::query_as("SELECT chapter_id, subtopic_id FROM pages WHERE id = $1")
            .bind(page_id)
            .fetch_optional(pool)
            .await?;

    match row {
        None => Ok(Access::NotFound),
        Some((Some(chapter_id), _)) => chapter_access(pool, chapter_id, caller_id).await,
        Some((None, Some(subtopic_id))) => subtopic_access(pool, subtopic_id, caller_id).await,
        // Unreachable under the pages_single_parent constraint
        Some((None, None)) => Ok(Access::NotFound),
    }
}

async fn owner_access(
    pool: &PgPool,
    query: &str,
    row_id: Uuid,
    caller_id: Uuid,
) -> Result<Access, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(query).bind(row_id).fetch_optional(pool).await?;
    Ok(match row {
        None => Access::NotFound,
        Some((owner_id,)) if owner_id == caller_id => Access::Allowed,
        Some(_) => Access::Forbidden,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip() {
        assert_eq!(Role::from_i32(1), Some(Role::Superadmin));
        assert_eq!(Role::from_i32(2), Some(Role::Author));
        assert_eq!(Role::from_i32(3), Some(Role::Reader));
        assert_eq!(Role::from_i32(0), None);
        assert_eq!(Role::from_i32(4), None);
        assert_eq!(Role::Author as i32, 2);
    }

    #[test]
    fn role_home_paths() {
        assert_eq!(Role::Superadmin.home_path(), "/dashboard");
        assert_eq!(Role::Author.home_path(), "/author");
        assert_eq!(Role::Reader.home_path(), "/");
    }

    #[test]
    fn forbidden_and_missing_are_indistinguishable() {
        let forbidden = Access::Forbidden.into_result("Book").unwrap_err();
        let missing = Access::NotFound.into_result("Book").unwrap_err();
        assert_eq!(forbidden.status_code(), 404);
        assert_eq!(missing.status_code(), 404);
        assert_eq!(forbidden.message(), missing.message());
        assert!(Access::Allowed.into_result("Book").is_ok());
    }
}
