use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::Listing;
use super::specs::Specifications;

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub price: f64,
    pub description: String,
    pub location: String,
    pub category: String,
    #[serde(default = "empty_object")]
    pub specifications: Value,
    #[serde(default)]
    pub images: Vec<serde_bytes::ByteBuf>,
    #[serde(default)]
    pub content_types: Vec<String>, // parallel to images; default image/jpeg
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub images: Vec<String>,
    pub location: String,
    pub category: String,
    pub specifications: Specifications,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub is_favorite: bool,
}

impl ListingResponse {
    pub fn from_listing(listing: Listing, favorites: &HashSet<Uuid>) -> Self {
        let specifications = listing.specs();
        Self {
            is_favorite: favorites.contains(&listing.id),
            id: listing.id,
            title: listing.title,
            price: listing.price,
            description: listing.description,
            images: listing.images,
            location: listing.location,
            category: listing.category,
            specifications,
            user_id: listing.user_id,
            created_at: listing.created_at,
        }
    }

    pub fn from_listings(listings: Vec<Listing>, favorites: &HashSet<Uuid>) -> Vec<Self> {
        listings
            .into_iter()
            .map(|l| Self::from_listing(l, favorites))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn annotation_marks_favorited_ids() {
        let mut favorites = HashSet::new();
        let listing = Listing {
            id: Uuid::new_v4(),
            title: "Camry".into(),
            price: 50_000.0,
            description: "clean".into(),
            images: vec![],
            location: "Dubai".into(),
            category: "Vehicles".into(),
            specifications: json!({}),
            user_id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
        };

        let plain = ListingResponse::from_listing(listing.clone(), &favorites);
        assert!(!plain.is_favorite);

        favorites.insert(listing.id);
        let marked = ListingResponse::from_listing(listing, &favorites);
        assert!(marked.is_favorite);
    }

    #[test]
    fn create_request_defaults() {
        let req: CreateListingRequest = serde_json::from_value(json!({
            "title": "Old chair",
            "price": 100,
            "description": "solid wood",
            "location": "Dubai",
            "category": "Furniture"
        }))
        .unwrap();
        assert!(req.images.is_empty());
        assert!(req.content_types.is_empty());
        assert_eq!(req.specifications, json!({}));
    }
}
