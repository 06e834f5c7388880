use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use super::cache::filter_to_favorites;
use crate::auth::extractors::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::listings::dto::ListingResponse;
use crate::listings::filter::ListingFilter;
use crate::listings::repo as listings_repo;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites))
        .route("/favorites/:listing_id/toggle", post(toggle))
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub listing_id: Uuid,
    pub is_favorite: bool,
}

#[instrument(skip(state))]
pub async fn toggle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(listing_id): Path<Uuid>,
) -> ApiResult<Json<ToggleResponse>> {
    // reject marks on listings that no longer exist
    listings_repo::get(&state.db, listing_id)
        .await?
        .ok_or(ApiError::NotFound("listing"))?;

    let is_favorite = state.favorites.toggle(user_id, listing_id).await?;
    Ok(Json(ToggleResponse {
        listing_id,
        is_favorite,
    }))
}

/// Favorites view, newest first. Without a filter this is the join of live
/// listings and the user's marks; with one it is the intersection of the
/// filtered result set and the favorited IDs. Either way a stale mark on a
/// deleted listing never shows up.
#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<ListingFilter>,
) -> ApiResult<Json<Vec<ListingResponse>>> {
    filter.validate()?;
    let favorites = state.favorites.ids(user_id).await?;

    let listings = if filter.is_empty() {
        listings_repo::list_favorited(&state.db, user_id).await?
    } else {
        let results = listings_repo::search(&state.db, &filter).await?;
        filter_to_favorites(&favorites, &results)
    };

    Ok(Json(ListingResponse::from_listings(listings, &favorites)))
}
