//! # REST API for the Calendar
//!
//! Appointment CRUD plus two read views: the month grid and the list of
//! appointments starting within the next few hours.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use shared::{CreateAppointmentRequest, UpdateAppointmentRequest};
use tracing::info;

use super::mappers::calendar_mapper::CalendarMapper;
use super::{error_response, CurrentUser};
use crate::domain::models::YearMonth;
use crate::AppState;

pub const DEFAULT_UPCOMING_HOURS: i64 = 24;

/// Routes mounted at `/api/appointments`
pub fn appointment_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route("/:id", get(get_appointment).put(update_appointment).delete(delete_appointment))
}

/// Routes mounted at `/api/calendar`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/month", get(get_calendar_month))
        .route("/upcoming", get(get_upcoming))
}

/// Date range of the appointment listing; defaults to the current month
#[derive(Debug, Deserialize)]
pub struct AppointmentRangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarMonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub hours: Option<i64>,
}

pub async fn list_appointments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AppointmentRangeQuery>,
) -> impl IntoResponse {
    info!("GET /api/appointments - user: {}, query: {:?}", user.id, query);

    let current = YearMonth::of(Utc::now().date_naive());
    let start = query.start.unwrap_or_else(|| current.first_day());
    let end = query.end.unwrap_or_else(|| current.last_day());

    match state.calendar_service.list_appointments(&user, start, end).await {
        Ok(appointments) => (StatusCode::OK, Json(CalendarMapper::to_dto_list(appointments))).into_response(),
        Err(e) => error_response("Failed to list appointments", e),
    }
}

pub async fn create_appointment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateAppointmentRequest>,
) -> impl IntoResponse {
    info!("POST /api/appointments - user: {}, request: {:?}", user.id, request);

    match state
        .calendar_service
        .create_appointment(&user, CalendarMapper::to_create_command(request))
        .await
    {
        Ok(appointment) => (StatusCode::CREATED, Json(CalendarMapper::to_dto(appointment))).into_response(),
        Err(e) => error_response("Failed to create appointment", e),
    }
}

pub async fn get_appointment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/appointments/{}", id);

    match state.calendar_service.get_appointment(&user, &id).await {
        Ok(appointment) => (StatusCode::OK, Json(CalendarMapper::to_dto(appointment))).into_response(),
        Err(e) => error_response("Failed to get appointment", e),
    }
}

pub async fn update_appointment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> impl IntoResponse {
    info!("PUT /api/appointments/{} - request: {:?}", id, request);

    match state
        .calendar_service
        .update_appointment(&user, &id, CalendarMapper::to_update_command(request))
        .await
    {
        Ok(appointment) => (StatusCode::OK, Json(CalendarMapper::to_dto(appointment))).into_response(),
        Err(e) => error_response("Failed to update appointment", e),
    }
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/appointments/{}", id);

    match state.calendar_service.delete_appointment(&user, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete appointment", e),
    }
}

/// Month grid; year and month default to the current ones
pub async fn get_calendar_month(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CalendarMonthQuery>,
) -> impl IntoResponse {
    info!("GET /api/calendar/month - user: {}, query: {:?}", user.id, query);

    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    match state.calendar_service.month_view(&user, year, month).await {
        Ok(view) => (StatusCode::OK, Json(CalendarMapper::to_month_dto(view))).into_response(),
        Err(e) => error_response("Failed to build calendar month", e),
    }
}

pub async fn get_upcoming(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<UpcomingQuery>,
) -> impl IntoResponse {
    let hours = query.hours.unwrap_or(DEFAULT_UPCOMING_HOURS);
    info!("GET /api/calendar/upcoming - user: {}, hours: {}", user.id, hours);

    match state.calendar_service.upcoming(&user, Utc::now(), hours).await {
        Ok(appointments) => (StatusCode::OK, Json(CalendarMapper::to_dto_list(appointments))).into_response(),
        Err(e) => error_response("Failed to list upcoming appointments", e),
    }
}
