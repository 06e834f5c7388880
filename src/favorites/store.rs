use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Authoritative favorite-mark persistence. A mark is pure existence of the
/// (listing, user) pair; it never expires on its own.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn add(&self, user_id: Uuid, listing_id: Uuid) -> anyhow::Result<()>;
    async fn remove(&self, user_id: Uuid, listing_id: Uuid) -> anyhow::Result<()>;
    async fn ids_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Uuid>>;
}

pub struct PgFavoriteStore {
    db: PgPool,
}

impl PgFavoriteStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FavoriteStore for PgFavoriteStore {
    async fn add(&self, user_id: Uuid, listing_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO favorites (listing_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(listing_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, listing_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM favorites
            WHERE listing_id = $1 AND user_id = $2
            "#,
        )
        .bind(listing_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn ids_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT listing_id FROM favorites WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(ids)
    }
}

/// Test double with switchable failure injection.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryFavoriteStore {
    pub rows: std::sync::Mutex<std::collections::HashSet<(Uuid, Uuid)>>,
    pub fail_writes: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl MemoryFavoriteStore {
    fn check_failure(&self) -> anyhow::Result<()> {
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            anyhow::bail!("injected store failure");
        }
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl FavoriteStore for MemoryFavoriteStore {
    async fn add(&self, user_id: Uuid, listing_id: Uuid) -> anyhow::Result<()> {
        self.check_failure()?;
        self.rows.lock().unwrap().insert((user_id, listing_id));
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, listing_id: Uuid) -> anyhow::Result<()> {
        self.check_failure()?;
        self.rows.lock().unwrap().remove(&(user_id, listing_id));
        Ok(())
    }

    async fn ids_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, l)| *l)
            .collect())
    }
}
