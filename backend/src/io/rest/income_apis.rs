//! # REST API for Incomes
//!
//! Every endpoint needs the income tracking feature.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::{CreateIncomeRequest, UpdateIncomeRequest};
use tracing::info;

use super::expense_apis::RecordQuery;
use super::mappers::ledger_mapper::IncomeMapper;
use super::{error_response, CurrentUser};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_incomes).post(create_income))
        .route("/:id", get(get_income).put(update_income).delete(delete_income))
}

/// `category` filters on the income source
pub async fn list_incomes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RecordQuery>,
) -> impl IntoResponse {
    info!("GET /api/incomes - user: {}, query: {:?}", user.id, query);

    match state.income_service.list_incomes(&user, query.into()).await {
        Ok(page) => (StatusCode::OK, Json(IncomeMapper::to_list_response(page))).into_response(),
        Err(e) => error_response("Failed to list incomes", e),
    }
}

pub async fn create_income(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateIncomeRequest>,
) -> impl IntoResponse {
    info!("POST /api/incomes - user: {}, request: {:?}", user.id, request);

    match state
        .income_service
        .create_income(&user, IncomeMapper::to_create_command(request))
        .await
    {
        Ok(income) => (StatusCode::CREATED, Json(IncomeMapper::to_dto(income))).into_response(),
        Err(e) => error_response("Failed to create income", e),
    }
}

pub async fn get_income(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/incomes/{}", id);

    match state.income_service.get_income(&user, &id).await {
        Ok(income) => (StatusCode::OK, Json(IncomeMapper::to_dto(income))).into_response(),
        Err(e) => error_response("Failed to get income", e),
    }
}

pub async fn update_income(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateIncomeRequest>,
) -> impl IntoResponse {
    info!("PUT /api/incomes/{} - request: {:?}", id, request);

    match state
        .income_service
        .update_income(&user, &id, IncomeMapper::to_update_command(request))
        .await
    {
        Ok(income) => (StatusCode::OK, Json(IncomeMapper::to_dto(income))).into_response(),
        Err(e) => error_response("Failed to update income", e),
    }
}

pub async fn delete_income(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/incomes/{}", id);

    match state.income_service.delete_income(&user, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete income", e),
    }
}
