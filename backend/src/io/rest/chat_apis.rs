//! # REST API for the Chat Assistant
//!
//! Each message advances the caller's conversation. A confirmed draft is
//! saved as an expense, income or appointment and reported in `created`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use shared::ChatMessageRequest;
use tracing::info;

use super::mappers::chat_mapper::ChatMapper;
use super::{error_response, CurrentUser};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", post(send_message))
        .route("/session", get(get_session).delete(reset_session))
}

pub async fn send_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<ChatMessageRequest>,
) -> impl IntoResponse {
    info!("POST /api/chat/messages - user: {}", user.id);

    match state.chat_service.handle_message(&user, &request.message, Utc::now()).await {
        Ok(turn) => (StatusCode::OK, Json(ChatMapper::to_reply_dto(turn))).into_response(),
        Err(e) => error_response("Failed to handle chat message", e),
    }
}

pub async fn get_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    info!("GET /api/chat/session - user: {}", user.id);

    match state.chat_service.session(&user).await {
        Ok(session) => (StatusCode::OK, Json(ChatMapper::to_session_dto(session))).into_response(),
        Err(e) => error_response("Failed to load chat session", e),
    }
}

/// Drop any pending draft and start over
pub async fn reset_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    info!("DELETE /api/chat/session - user: {}", user.id);

    match state.chat_service.reset(&user).await {
        Ok(session) => (StatusCode::OK, Json(ChatMapper::to_session_dto(session))).into_response(),
        Err(e) => error_response("Failed to reset chat session", e),
    }
}
