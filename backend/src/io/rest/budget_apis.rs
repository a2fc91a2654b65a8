//! # REST API for Budgets
//!
//! A budget is unique per category and month, so `POST /api/budgets` either
//! creates it or replaces its amount.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get},
    Router,
};
use serde::Deserialize;
use shared::UpsertBudgetRequest;
use tracing::info;

use super::mappers::planning_mapper::BudgetMapper;
use super::{error_response, month_or_current, CurrentUser};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_budgets).post(upsert_budget))
        .route("/status", get(get_budget_status))
        .route("/:id", delete(delete_budget))
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    /// `YYYY-MM`, defaults to the current month
    pub month: Option<String>,
}

pub async fn list_budgets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    info!("GET /api/budgets - user: {}, month: {:?}", user.id, query.month);

    let month = match month_or_current(query.month.as_deref()) {
        Ok(month) => month,
        Err(e) => return error_response("Invalid budget month", e),
    };

    match state.budget_service.list_budgets(&user, month).await {
        Ok(budgets) => {
            let response: Vec<_> = budgets.into_iter().map(BudgetMapper::to_dto).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Failed to list budgets", e),
    }
}

pub async fn upsert_budget(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpsertBudgetRequest>,
) -> impl IntoResponse {
    info!("POST /api/budgets - user: {}, request: {:?}", user.id, request);

    match state
        .budget_service
        .upsert_budget(&user, BudgetMapper::to_upsert_command(request))
        .await
    {
        Ok(budget) => (StatusCode::OK, Json(BudgetMapper::to_dto(budget))).into_response(),
        Err(e) => error_response("Failed to save budget", e),
    }
}

pub async fn delete_budget(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/budgets/{}", id);

    match state.budget_service.delete_budget(&user, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete budget", e),
    }
}

/// Spent, remaining and health of every budget of the month
pub async fn get_budget_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    info!("GET /api/budgets/status - user: {}, month: {:?}", user.id, query.month);

    let month = match month_or_current(query.month.as_deref()) {
        Ok(month) => month,
        Err(e) => return error_response("Invalid budget month", e),
    };

    match state.budget_service.status(&user, month).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => error_response("Failed to compute budget status", e),
    }
}
