//! # REST API for Users and Plans
//!
//! Registration is the only endpoint that does not need the `x-user-id` header.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use shared::{CreateUserRequest, UpdatePlanRequest, UpdateUserRequest};
use tracing::info;

use super::mappers::user_mapper::UserMapper;
use super::{error_response, CurrentUser};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/me", get(get_current_user).patch(update_profile))
        .route("/me/plan", put(update_plan))
        .route("/me/features", get(get_features))
}

/// Register a new user on a trial plan
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> impl IntoResponse {
    info!("POST /api/users - email: {}", request.email);

    match state.user_service.create_user(UserMapper::to_create_command(request)).await {
        Ok(user) => (StatusCode::CREATED, Json(UserMapper::to_dto(user))).into_response(),
        Err(e) => error_response("Failed to create user", e),
    }
}

pub async fn get_current_user(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    info!("GET /api/users/me - user: {}", user.id);
    (StatusCode::OK, Json(UserMapper::to_dto(user))).into_response()
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    info!("PATCH /api/users/me - user: {}", user.id);

    match state
        .user_service
        .update_profile(&user.id, UserMapper::to_update_command(request))
        .await
    {
        Ok(user) => (StatusCode::OK, Json(UserMapper::to_dto(user))).into_response(),
        Err(e) => error_response("Failed to update profile", e),
    }
}

pub async fn update_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdatePlanRequest>,
) -> impl IntoResponse {
    info!("PUT /api/users/me/plan - user: {}, plan: {}", user.id, request.plan_tier);

    match state.user_service.update_plan(&user.id, request.plan_tier).await {
        Ok(user) => (StatusCode::OK, Json(UserMapper::to_dto(user))).into_response(),
        Err(e) => error_response("Failed to update plan", e),
    }
}

/// Which gated features the calling user can use right now
pub async fn get_features(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    info!("GET /api/users/me/features - user: {}", user.id);
    (StatusCode::OK, Json(state.user_service.features(&user, Utc::now()))).into_response()
}
