use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str =
    "id, full_name, phone_number, avatar_url, bio, location, created_at, updated_at";

pub async fn get(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(&format!(
        "SELECT {COLUMNS} FROM profiles WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(profile)
}

/// Upsert keeping any field the caller did not send.
pub async fn upsert(
    db: &PgPool,
    user_id: Uuid,
    full_name: Option<&str>,
    phone_number: Option<&str>,
    bio: Option<&str>,
    location: Option<&str>,
) -> anyhow::Result<Profile> {
    let profile = sqlx::query_as::<_, Profile>(&format!(
        r#"
        INSERT INTO profiles (id, full_name, phone_number, bio, location)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE SET
            full_name = COALESCE(EXCLUDED.full_name, profiles.full_name),
            phone_number = COALESCE(EXCLUDED.phone_number, profiles.phone_number),
            bio = COALESCE(EXCLUDED.bio, profiles.bio),
            location = COALESCE(EXCLUDED.location, profiles.location),
            updated_at = now()
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(full_name)
    .bind(phone_number)
    .bind(bio)
    .bind(location)
    .fetch_one(db)
    .await?;
    Ok(profile)
}

pub async fn set_avatar(db: &PgPool, user_id: Uuid, avatar_url: &str) -> anyhow::Result<Profile> {
    let profile = sqlx::query_as::<_, Profile>(&format!(
        r#"
        INSERT INTO profiles (id, avatar_url)
        VALUES ($1, $2)
        ON CONFLICT (id) DO UPDATE SET
            avatar_url = EXCLUDED.avatar_url,
            updated_at = now()
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(avatar_url)
    .fetch_one(db)
    .await?;
    Ok(profile)
}
