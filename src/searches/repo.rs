use serde::Serialize;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::listings::filter::ListingFilter;

/// A persisted (query, filter) snapshot. `new_listings_count` and
/// `last_checked` are written by an external notification job; this app only
/// ever reads them.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SavedSearch {
    pub id: Uuid,
    pub user_id: Uuid,
    pub query: String,
    pub filters: Json<ListingFilter>,
    pub notifications_enabled: bool,
    pub new_listings_count: i32,
    pub last_checked: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str = "id, user_id, query, filters, notifications_enabled, new_listings_count, last_checked, created_at, updated_at";

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    query: &str,
    filters: &ListingFilter,
) -> anyhow::Result<SavedSearch> {
    let row = sqlx::query_as::<_, SavedSearch>(&format!(
        r#"
        INSERT INTO saved_searches
            (user_id, query, filters, notifications_enabled, new_listings_count, last_checked)
        VALUES ($1, $2, $3, TRUE, 0, now())
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(query)
    .bind(Json(filters.clone()))
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<SavedSearch>> {
    let rows = sqlx::query_as::<_, SavedSearch>(&format!(
        "SELECT {COLUMNS} FROM saved_searches WHERE user_id = $1 ORDER BY updated_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Flip notifications in place. SQL `NOT` makes the flip exact: applying it
/// twice restores the original value regardless of what it was.
pub async fn toggle_notifications(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<SavedSearch>> {
    let row = sqlx::query_as::<_, SavedSearch>(&format!(
        r#"
        UPDATE saved_searches
        SET notifications_enabled = NOT notifications_enabled, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Uuid>> {
    let deleted = sqlx::query_scalar::<_, Uuid>(
        r#"
        DELETE FROM saved_searches
        WHERE id = $1 AND user_id = $2
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(deleted)
}
