use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::repo::{self, SavedSearch};
use crate::auth::extractors::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::listings::filter::ListingFilter;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/searches", get(list).post(save))
        .route("/searches/:id", delete(remove))
        .route("/searches/:id/notifications", post(toggle_notifications))
}

#[derive(Debug, Deserialize)]
pub struct SaveSearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub filters: ListingFilter,
}

#[instrument(skip(state, payload))]
pub async fn save(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SaveSearchRequest>,
) -> ApiResult<(StatusCode, Json<SavedSearch>)> {
    if payload.query.trim().is_empty() && payload.filters.is_empty() {
        return Err(ApiError::validation("nothing to save: empty query and filter"));
    }
    payload.filters.validate()?;

    let saved = repo::insert(&state.db, user_id, payload.query.trim(), &payload.filters).await?;
    info!(search_id = %saved.id, user_id = %user_id, "search saved");
    Ok((StatusCode::CREATED, Json(saved)))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<SavedSearch>>> {
    let rows = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn toggle_notifications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SavedSearch>> {
    let updated = repo::toggle_notifications(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("saved search"))?;
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    repo::delete(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("saved search"))?;
    info!(search_id = %id, user_id = %user_id, "search deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_request_defaults_to_empty_snapshot() {
        let req: SaveSearchRequest = serde_json::from_str(r#"{"query": "camry"}"#).unwrap();
        assert_eq!(req.query, "camry");
        assert!(req.filters.is_empty());
    }

    #[test]
    fn save_request_carries_filter_snapshot() {
        let req: SaveSearchRequest = serde_json::from_str(
            r#"{"query": "", "filters": {"category": "Vehicles", "price_max": 60000}}"#,
        )
        .unwrap();
        assert_eq!(req.filters.category.as_deref(), Some("Vehicles"));
        assert_eq!(req.filters.price_max, Some(60_000.0));
    }
}
