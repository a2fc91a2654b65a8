//! # REST API for Analytics
//!
//! The dashboard is available on every plan; the other views need advanced
//! analytics.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use super::budget_apis::MonthQuery;
use super::mappers::analytics_mapper::AnalyticsMapper;
use super::{error_response, month_or_current, CurrentUser};
use crate::domain::analytics_service::DEFAULT_TEMPORAL_MONTHS;
use crate::domain::models::YearMonth;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/categories", get(get_categories))
        .route("/temporal", get(get_temporal))
        .route("/advanced", get(get_advanced))
}

/// Date range of the category breakdown; defaults to the current month
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct TemporalQuery {
    pub months: Option<u32>,
    /// Last month of the series, `YYYY-MM`
    pub end_month: Option<String>,
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    info!("GET /api/analytics/dashboard - user: {}, month: {:?}", user.id, query.month);

    let month = match month_or_current(query.month.as_deref()) {
        Ok(month) => month,
        Err(e) => return error_response("Invalid dashboard month", e),
    };

    match state.analytics_service.dashboard(&user, month, Utc::now()).await {
        Ok(result) => (StatusCode::OK, Json(AnalyticsMapper::to_dashboard_dto(result))).into_response(),
        Err(e) => error_response("Failed to build dashboard", e),
    }
}

pub async fn get_categories(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CategoryQuery>,
) -> impl IntoResponse {
    info!("GET /api/analytics/categories - user: {}, query: {:?}", user.id, query);

    let now = Utc::now();
    let current = YearMonth::of(now.date_naive());
    let start = query.start_date.unwrap_or_else(|| current.first_day());
    let end = query.end_date.unwrap_or_else(|| current.last_day());

    match state.analytics_service.categories(&user, start, end, now).await {
        Ok(analysis) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => error_response("Failed to analyse categories", e),
    }
}

pub async fn get_temporal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<TemporalQuery>,
) -> impl IntoResponse {
    info!("GET /api/analytics/temporal - user: {}, query: {:?}", user.id, query);

    let end_month = match month_or_current(query.end_month.as_deref()) {
        Ok(month) => month,
        Err(e) => return error_response("Invalid end month", e),
    };
    let months = query.months.unwrap_or(DEFAULT_TEMPORAL_MONTHS);

    match state.analytics_service.temporal(&user, months, end_month, Utc::now()).await {
        Ok(analysis) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => error_response("Failed to analyse spending over time", e),
    }
}

pub async fn get_advanced(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    info!("GET /api/analytics/advanced - user: {}, month: {:?}", user.id, query.month);

    let month = match month_or_current(query.month.as_deref()) {
        Ok(month) => month,
        Err(e) => return error_response("Invalid month", e),
    };

    match state.analytics_service.advanced(&user, month, Utc::now()).await {
        Ok(result) => (StatusCode::OK, Json(AnalyticsMapper::to_advanced_dto(result))).into_response(),
        Err(e) => error_response("Failed to build advanced analytics", e),
    }
}
