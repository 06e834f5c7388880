use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::repo::{self, Profile};
use crate::auth::extractors::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::media;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile", put(update_profile))
        .route("/profile/avatar", post(upload_avatar))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadAvatarRequest {
    pub image: serde_bytes::ByteBuf,
    #[serde(default = "default_avatar_mime")]
    pub content_type: String,
}

fn default_avatar_mime() -> String {
    "image/jpeg".into()
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub avatar_url: String,
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Profile>> {
    let profile = repo::get(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("profile"))?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<Profile>> {
    let profile = repo::upsert(
        &state.db,
        user_id,
        payload.full_name.as_deref(),
        payload.phone_number.as_deref(),
        payload.bio.as_deref(),
        payload.location.as_deref(),
    )
    .await?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UploadAvatarRequest>,
) -> ApiResult<Json<AvatarResponse>> {
    if payload.image.is_empty() {
        return Err(ApiError::validation("image must not be empty"));
    }

    let old_avatar = repo::get(&state.db, user_id)
        .await?
        .and_then(|p| p.avatar_url);

    let url = media::upload_avatar(
        &state,
        user_id,
        bytes::Bytes::from(payload.image.into_vec()),
        &payload.content_type,
    )
    .await?;
    repo::set_avatar(&state.db, user_id, &url).await?;

    // old object is unreachable once the profile points elsewhere
    if let Some(old) = old_avatar {
        media::delete_by_url(&state, &old).await.ok();
    }

    info!(user_id = %user_id, "avatar updated");
    Ok(Json(AvatarResponse { avatar_url: url }))
}
