//! # REST API for Notifications
//!
//! Reading the inbox first brings time-based notices (appointment reminders,
//! trial expiry) up to date.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use shared::{MarkAllReadResponse, UnreadCountResponse};
use tracing::info;

use super::mappers::notification_mapper::NotificationMapper;
use super::{error_response, CurrentUser};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(get_unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/:id/read", post(mark_read))
        .route("/:id", delete(delete_notification))
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<u32>,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<NotificationQuery>,
) -> impl IntoResponse {
    info!("GET /api/notifications - user: {}, query: {:?}", user.id, query);

    match state
        .notification_service
        .list(&user, query.unread_only, query.limit, Utc::now())
        .await
    {
        Ok(notifications) => {
            (StatusCode::OK, Json(NotificationMapper::to_dto_list(notifications))).into_response()
        }
        Err(e) => error_response("Failed to list notifications", e),
    }
}

pub async fn get_unread_count(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    info!("GET /api/notifications/unread-count - user: {}", user.id);

    match state.notification_service.unread_count(&user, Utc::now()).await {
        Ok(unread) => (StatusCode::OK, Json(UnreadCountResponse { unread })).into_response(),
        Err(e) => error_response("Failed to count notifications", e),
    }
}

pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/notifications/{}/read", id);

    match state.notification_service.mark_read(&user.id, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to mark notification read", e),
    }
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    info!("POST /api/notifications/read-all - user: {}", user.id);

    match state.notification_service.mark_all_read(&user.id).await {
        Ok(updated) => (StatusCode::OK, Json(MarkAllReadResponse { updated })).into_response(),
        Err(e) => error_response("Failed to mark notifications read", e),
    }
}

pub async fn delete_notification(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/notifications/{}", id);

    match state.notification_service.delete(&user.id, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete notification", e),
    }
}
