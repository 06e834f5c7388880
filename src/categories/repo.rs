use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub title: String,
    pub icon: String,
    pub created_at: OffsetDateTime,
}

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Category>> {
    let rows = sqlx::query_as::<_, Category>(
        r#"
        SELECT title, icon, created_at
        FROM categories
        ORDER BY title ASC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}
