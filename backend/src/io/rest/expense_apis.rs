//! # REST API for Expenses
//!
//! Listing is newest first and cursor based: pass the `next_cursor` of one
//! page as `after` to fetch the next.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::{CreateExpenseRequest, UpdateExpenseRequest};
use tracing::info;

use super::mappers::ledger_mapper::ExpenseMapper;
use super::{error_response, CurrentUser};
use crate::domain::commands::ledger::RecordListQuery;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route("/:id", get(get_expense).put(update_expense).delete(delete_expense))
}

/// Query parameters shared by the expense and income listings
#[derive(Debug, Default, Deserialize)]
pub struct RecordQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub after: Option<String>,
    pub limit: Option<u32>,
}

impl From<RecordQuery> for RecordListQuery {
    fn from(query: RecordQuery) -> Self {
        RecordListQuery {
            start_date: query.start_date,
            end_date: query.end_date,
            category: query.category,
            after: query.after,
            limit: query.limit,
        }
    }
}

pub async fn list_expenses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RecordQuery>,
) -> impl IntoResponse {
    info!("GET /api/expenses - user: {}, query: {:?}", user.id, query);

    match state.expense_service.list_expenses(&user, query.into()).await {
        Ok(page) => (StatusCode::OK, Json(ExpenseMapper::to_list_response(page))).into_response(),
        Err(e) => error_response("Failed to list expenses", e),
    }
}

pub async fn create_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    info!("POST /api/expenses - user: {}, request: {:?}", user.id, request);

    match state
        .expense_service
        .create_expense(&user, ExpenseMapper::to_create_command(request))
        .await
    {
        Ok(expense) => (StatusCode::CREATED, Json(ExpenseMapper::to_dto(expense))).into_response(),
        Err(e) => error_response("Failed to create expense", e),
    }
}

pub async fn get_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/expenses/{}", id);

    match state.expense_service.get_expense(&user, &id).await {
        Ok(expense) => (StatusCode::OK, Json(ExpenseMapper::to_dto(expense))).into_response(),
        Err(e) => error_response("Failed to get expense", e),
    }
}

pub async fn update_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateExpenseRequest>,
) -> impl IntoResponse {
    info!("PUT /api/expenses/{} - request: {:?}", id, request);

    match state
        .expense_service
        .update_expense(&user, &id, ExpenseMapper::to_update_command(request))
        .await
    {
        Ok(expense) => (StatusCode::OK, Json(ExpenseMapper::to_dto(expense))).into_response(),
        Err(e) => error_response("Failed to update expense", e),
    }
}

pub async fn delete_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/expenses/{}", id);

    match state.expense_service.delete_expense(&user, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete expense", e),
    }
}
