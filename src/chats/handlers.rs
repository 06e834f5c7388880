use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::repo::{self, Chat, ChatMessage};
use crate::auth::extractors::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::listings::repo as listings_repo;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chats", get(list).post(open))
        .route("/chats/:id/messages", get(messages).post(send))
}

#[derive(Debug, Deserialize)]
pub struct OpenChatRequest {
    pub listing_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[instrument(skip(state, payload))]
pub async fn open(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<OpenChatRequest>,
) -> ApiResult<Json<Chat>> {
    let listing = listings_repo::get(&state.db, payload.listing_id)
        .await?
        .ok_or(ApiError::NotFound("listing"))?;
    if listing.user_id == user_id {
        return Err(ApiError::validation("cannot open a chat on your own listing"));
    }

    let chat = repo::find_or_create(&state.db, listing.id, user_id, listing.user_id).await?;
    info!(chat_id = %chat.id, listing_id = %listing.id, "chat opened");
    Ok(Json(chat))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<Chat>>> {
    let chats = repo::list_for_user(&state.db, user_id).await?;
    Ok(Json(chats))
}

async fn member_chat(state: &AppState, chat_id: Uuid, user_id: Uuid) -> ApiResult<Chat> {
    // non-participants get the same answer as a missing chat
    let chat = repo::get(&state.db, chat_id)
        .await?
        .ok_or(ApiError::NotFound("chat"))?;
    if !chat.involves(user_id) {
        return Err(ApiError::NotFound("chat"));
    }
    Ok(chat)
}

#[instrument(skip(state))]
pub async fn messages(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(chat_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    member_chat(&state, chat_id, user_id).await?;
    let messages = repo::messages(&state.db, chat_id).await?;
    Ok(Json(messages))
}

#[instrument(skip(state, payload))]
pub async fn send(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(chat_id): Path<Uuid>,
    Json(payload): Json<SendMessageRequest>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(ApiError::validation("message must not be empty"));
    }
    member_chat(&state, chat_id, user_id).await?;

    let message = repo::send_message(&state.db, chat_id, user_id, content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
