use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{CreateListingRequest, ListingResponse};
use super::filter::ListingFilter;
use super::repo;
use crate::auth::extractors::{AuthUser, MaybeAuthUser};
use crate::error::{ApiError, ApiResult};
use crate::media::{self, UploadItem, MAX_LISTING_IMAGES};
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(search))
        .route("/listings/latest", get(latest_results))
        .route("/listings/:id", get(get_one))
        .route("/categories/:category/listings", get(by_category))
        .route("/me/listings", get(my_listings))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/listings", post(create))
}

async fn favorite_ids(state: &AppState, user: Option<Uuid>) -> ApiResult<HashSet<Uuid>> {
    match user {
        Some(user_id) => Ok(state.favorites.ids(user_id).await?),
        None => Ok(HashSet::new()),
    }
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Query(filter): Query<ListingFilter>,
) -> ApiResult<Json<Vec<ListingResponse>>> {
    filter.validate()?;

    // Authenticated searches go through the user's feed: the ticket is taken
    // before the fetch, so when requests overlap only the latest-issued one
    // lands and a slow stale response cannot clobber it.
    let listings = match user {
        Some(user_id) => {
            let feed = state.search_feeds.for_user(user_id).await;
            let ticket = feed.begin();
            let results = repo::search(&state.db, &filter).await?;
            feed.apply(ticket, results.clone());
            results
        }
        None => repo::search(&state.db, &filter).await?,
    };

    let favorites = favorite_ids(&state, user).await?;
    Ok(Json(ListingResponse::from_listings(listings, &favorites)))
}

/// The user's currently visible result set: whatever their latest completed
/// search installed in the feed.
#[instrument(skip(state))]
pub async fn latest_results(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<ListingResponse>>> {
    let feed = state.search_feeds.for_user(user_id).await;
    let listings = feed.current().unwrap_or_default();
    let favorites = state.favorites.ids(user_id).await?;
    Ok(Json(ListingResponse::from_listings(listings, &favorites)))
}

#[instrument(skip(state))]
pub async fn get_one(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ListingResponse>> {
    let listing = repo::get(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("listing"))?;
    let favorites = favorite_ids(&state, user).await?;
    Ok(Json(ListingResponse::from_listing(listing, &favorites)))
}

#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<ListingResponse>>> {
    let listings = repo::list_by_category(&state.db, &category).await?;
    let favorites = favorite_ids(&state, user).await?;
    Ok(Json(ListingResponse::from_listings(listings, &favorites)))
}

#[instrument(skip(state))]
pub async fn my_listings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<ListingResponse>>> {
    let listings = repo::list_by_owner(&state.db, user_id).await?;
    let favorites = state.favorites.ids(user_id).await?;
    Ok(Json(ListingResponse::from_listings(listings, &favorites)))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateListingRequest>,
) -> ApiResult<(StatusCode, Json<ListingResponse>)> {
    let CreateListingRequest {
        title,
        price,
        description,
        location,
        category,
        specifications,
        images,
        content_types,
    } = payload;

    if title.trim().is_empty() {
        return Err(ApiError::validation("title must not be empty"));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::validation("price must be a non-negative number"));
    }
    if images.len() > MAX_LISTING_IMAGES {
        return Err(ApiError::validation(format!(
            "at most {} images per listing",
            MAX_LISTING_IMAGES
        )));
    }

    // upload first; the row stores public URLs
    let items: Vec<UploadItem> = images
        .into_iter()
        .enumerate()
        .map(|(i, buf)| UploadItem {
            body: bytes::Bytes::from(buf.into_vec()),
            content_type: content_types
                .get(i)
                .cloned()
                .unwrap_or_else(|| "image/jpeg".into()),
        })
        .collect();
    let image_urls = media::upload_listing_images(&state, user_id, items).await?;

    let created = repo::create(
        &state.db,
        user_id,
        title.trim(),
        price,
        &description,
        &image_urls,
        &location,
        &category,
        &specifications,
    )
    .await;

    let listing = match created {
        Ok(listing) => listing,
        Err(e) => {
            // the row never landed; don't orphan the uploads
            for url in &image_urls {
                media::delete_by_url(&state, url).await.ok();
            }
            return Err(e.into());
        }
    };

    info!(listing_id = %listing.id, user_id = %user_id, "listing created");
    let favorites = state.favorites.ids(user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ListingResponse::from_listing(listing, &favorites)),
    ))
}
