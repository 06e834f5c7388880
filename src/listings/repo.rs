use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::filter::ListingFilter;
use super::specs::Specifications;

const LISTING_COLUMNS: &str =
    "id, title, price, description, images, location, category, specifications, user_id, created_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub images: Vec<String>,
    pub location: String,
    pub category: String,
    pub specifications: Value,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
}

impl Listing {
    pub fn specs(&self) -> Specifications {
        Specifications::from_value(&self.category, &self.specifications)
    }

    /// Mirrors the SQL `specifications->>'condition'` lookup: a raw
    /// `condition` key counts even when the category's typed schema has no
    /// such field.
    pub fn condition(&self) -> Option<String> {
        let specs = self.specs();
        if let Some(c) = specs.condition() {
            return Some(c.to_string());
        }
        self.specifications
            .get("condition")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    title: &str,
    price: f64,
    description: &str,
    images: &[String],
    location: &str,
    category: &str,
    specifications: &Value,
) -> anyhow::Result<Listing> {
    let listing = sqlx::query_as::<_, Listing>(
        r#"
        INSERT INTO listings (title, price, description, images, location, category, specifications, user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, title, price, description, images, location, category, specifications, user_id, created_at
        "#,
    )
    .bind(title)
    .bind(price)
    .bind(description)
    .bind(images)
    .bind(location)
    .bind(category)
    .bind(specifications)
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(listing)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Listing>> {
    let listing = sqlx::query_as::<_, Listing>(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(listing)
}

pub async fn list_by_owner(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Listing>> {
    let rows = sqlx::query_as::<_, Listing>(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_by_category(db: &PgPool, category: &str) -> anyhow::Result<Vec<Listing>> {
    let rows = sqlx::query_as::<_, Listing>(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE category = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(category)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Listings the user favorited, restricted to rows that still exist. The
/// inner join makes the favorites view the intersection of live listings and
/// favorite marks, so a stale mark on a deleted listing never shows up.
pub async fn list_favorited(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Listing>> {
    let rows = sqlx::query_as::<_, Listing>(
        r#"
        SELECT l.id, l.title, l.price, l.description, l.images, l.location,
               l.category, l.specifications, l.user_id, l.created_at
        FROM listings l
        INNER JOIN favorites f ON f.listing_id = l.id
        WHERE f.user_id = $1
        ORDER BY l.created_at DESC, l.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Translate a filter into one SQL predicate, ANDing every present field.
/// Mirrors `ListingFilter::matches`; newest first with id as the stable
/// tie-break so identical inputs give identical order.
pub async fn search(db: &PgPool, filter: &ListingFilter) -> anyhow::Result<Vec<Listing>> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {LISTING_COLUMNS} FROM listings WHERE TRUE"));

    if let Some(min) = filter.price_min {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.price_max {
        qb.push(" AND price <= ").push_bind(max);
    }
    if let Some(location) = &filter.location {
        qb.push(" AND location ILIKE ")
            .push_bind(format!("%{}%", location));
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(condition) = &filter.condition {
        qb.push(" AND specifications->>'condition' = ")
            .push_bind(condition.clone());
    }
    if let Some(query) = &filter.query {
        let pattern = format!("%{}%", query);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(" ORDER BY created_at DESC, id DESC");

    let rows = qb.build_query_as::<Listing>().fetch_all(db).await?;
    Ok(rows)
}
