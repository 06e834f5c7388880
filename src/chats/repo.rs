use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Chat {
    pub id: Uuid,
    pub participant1_id: Uuid,
    pub participant2_id: Uuid,
    pub listing_id: Uuid,
    pub last_message: Option<String>,
    pub last_message_time: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl Chat {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.participant1_id == user_id || self.participant2_id == user_id
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: OffsetDateTime,
}

const CHAT_COLUMNS: &str =
    "id, participant1_id, participant2_id, listing_id, last_message, last_message_time, created_at";

/// One chat per (listing, participant pair); reuse the existing row when the
/// buyer opens the conversation again.
pub async fn find_or_create(
    db: &PgPool,
    listing_id: Uuid,
    buyer_id: Uuid,
    seller_id: Uuid,
) -> anyhow::Result<Chat> {
    let existing = sqlx::query_as::<_, Chat>(&format!(
        r#"
        SELECT {CHAT_COLUMNS} FROM chats
        WHERE listing_id = $1
          AND ((participant1_id = $2 AND participant2_id = $3)
            OR (participant1_id = $3 AND participant2_id = $2))
        "#
    ))
    .bind(listing_id)
    .bind(buyer_id)
    .bind(seller_id)
    .fetch_optional(db)
    .await?;

    if let Some(chat) = existing {
        return Ok(chat);
    }

    let chat = sqlx::query_as::<_, Chat>(&format!(
        r#"
        INSERT INTO chats (participant1_id, participant2_id, listing_id, last_message_time)
        VALUES ($1, $2, $3, now())
        RETURNING {CHAT_COLUMNS}
        "#
    ))
    .bind(buyer_id)
    .bind(seller_id)
    .bind(listing_id)
    .fetch_one(db)
    .await?;
    Ok(chat)
}

pub async fn get(db: &PgPool, chat_id: Uuid) -> anyhow::Result<Option<Chat>> {
    let chat = sqlx::query_as::<_, Chat>(&format!(
        "SELECT {CHAT_COLUMNS} FROM chats WHERE id = $1"
    ))
    .bind(chat_id)
    .fetch_optional(db)
    .await?;
    Ok(chat)
}

pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Chat>> {
    let rows = sqlx::query_as::<_, Chat>(&format!(
        r#"
        SELECT {CHAT_COLUMNS} FROM chats
        WHERE participant1_id = $1 OR participant2_id = $1
        ORDER BY last_message_time DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn messages(db: &PgPool, chat_id: Uuid) -> anyhow::Result<Vec<ChatMessage>> {
    let rows = sqlx::query_as::<_, ChatMessage>(
        r#"
        SELECT id, chat_id, sender_id, content, created_at
        FROM messages
        WHERE chat_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(chat_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Insert the message and bump the chat preview in one transaction.
pub async fn send_message(
    db: &PgPool,
    chat_id: Uuid,
    sender_id: Uuid,
    content: &str,
) -> anyhow::Result<ChatMessage> {
    let mut tx = db.begin().await?;

    let message = sqlx::query_as::<_, ChatMessage>(
        r#"
        INSERT INTO messages (chat_id, sender_id, content)
        VALUES ($1, $2, $3)
        RETURNING id, chat_id, sender_id, content, created_at
        "#,
    )
    .bind(chat_id)
    .bind(sender_id)
    .bind(content)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE chats
        SET last_message = $2, last_message_time = now()
        WHERE id = $1
        "#,
    )
    .bind(chat_id)
    .bind(content)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(message)
}
