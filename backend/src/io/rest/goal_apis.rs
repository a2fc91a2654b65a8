//! # REST API for Savings Goals
//!
//! Contributions add to a goal's current amount. Reaching the target marks
//! the goal completed and posts a notification.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::{ContributeGoalRequest, CreateGoalRequest, UpdateGoalRequest};
use tracing::info;

use super::mappers::planning_mapper::GoalMapper;
use super::{error_response, CurrentUser};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_goals).post(create_goal))
        .route("/:id", get(get_goal).put(update_goal).delete(delete_goal))
        .route("/:id/contributions", post(contribute))
}

pub async fn list_goals(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    info!("GET /api/goals - user: {}", user.id);

    match state.goal_service.list_goals(&user).await {
        Ok(goals) => {
            let response: Vec<_> = goals.into_iter().map(GoalMapper::to_dto).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Failed to list goals", e),
    }
}

pub async fn create_goal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateGoalRequest>,
) -> impl IntoResponse {
    info!("POST /api/goals - user: {}, request: {:?}", user.id, request);

    match state
        .goal_service
        .create_goal(&user, GoalMapper::to_create_command(request))
        .await
    {
        Ok(goal) => (StatusCode::CREATED, Json(GoalMapper::to_dto(goal))).into_response(),
        Err(e) => error_response("Failed to create goal", e),
    }
}

pub async fn get_goal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/goals/{}", id);

    match state.goal_service.get_goal(&user, &id).await {
        Ok(goal) => (StatusCode::OK, Json(GoalMapper::to_dto(goal))).into_response(),
        Err(e) => error_response("Failed to get goal", e),
    }
}

pub async fn update_goal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateGoalRequest>,
) -> impl IntoResponse {
    info!("PUT /api/goals/{} - request: {:?}", id, request);

    match state
        .goal_service
        .update_goal(&user, &id, GoalMapper::to_update_command(request))
        .await
    {
        Ok(goal) => (StatusCode::OK, Json(GoalMapper::to_dto(goal))).into_response(),
        Err(e) => error_response("Failed to update goal", e),
    }
}

pub async fn delete_goal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/goals/{}", id);

    match state.goal_service.delete_goal(&user, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete goal", e),
    }
}

pub async fn contribute(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<ContributeGoalRequest>,
) -> impl IntoResponse {
    info!("POST /api/goals/{}/contributions - amount: {}", id, request.amount);

    match state.goal_service.contribute(&user, &id, request.amount).await {
        Ok(goal) => (StatusCode::OK, Json(GoalMapper::to_dto(goal))).into_response(),
        Err(e) => error_response("Failed to add contribution", e),
    }
}
