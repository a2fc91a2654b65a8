//! # REST API Interface Layer
//!
//! HTTP endpoints for the finance tracker, mounted under `/api`.
//!
//! ## Key Responsibilities
//!
//! - **API Endpoints**: RESTful HTTP interfaces for all operations
//! - **Error Handling**: Converting domain errors to proper HTTP responses
//! - **Authentication**: Resolving the calling user from the `x-user-id` header
//! - **Logging**: Request logging for debugging and monitoring
//!
//! ## Status Codes
//!
//! | Domain error      | Status |
//! |-------------------|--------|
//! | `Validation`      | 400    |
//! | `Unauthorized`    | 401    |
//! | `FeatureLocked`   | 403    |
//! | `NotFound`        | 404    |
//! | `Conflict`        | 409    |
//! | anything else     | 500    |

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::{error, warn};

use chrono::Utc;

use crate::domain::models::{DomainUser, YearMonth};
use crate::domain::DomainError;
use crate::AppState;

pub mod analytics_apis;
pub mod budget_apis;
pub mod calendar_apis;
pub mod chat_apis;
pub mod expense_apis;
pub mod goal_apis;
pub mod income_apis;
pub mod logging_apis;
pub mod mappers;
pub mod notification_apis;
pub mod user_apis;

/// Header carrying the id of the calling user
pub const USER_ID_HEADER: &str = "x-user-id";

/// Status code for an error returned by a service
pub fn status_for(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<DomainError>() {
        Some(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(DomainError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
        Some(DomainError::FeatureLocked { .. }) => StatusCode::FORBIDDEN,
        Some(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
        Some(DomainError::Conflict(_)) => StatusCode::CONFLICT,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turn a service error into a JSON error response.
///
/// Internal errors are logged in full and answered with a generic message.
pub fn error_response(context: &str, err: anyhow::Error) -> Response {
    let status = status_for(&err);
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("{}: {:#}", context, err);
        "Internal server error".to_string()
    } else {
        warn!("{}: {}", context, err);
        err.to_string()
    };
    (status, Json(ErrorResponse { error: message })).into_response()
}

/// Parse an optional `YYYY-MM` query value, defaulting to the current month
pub fn month_or_current(month: Option<&str>) -> anyhow::Result<YearMonth> {
    match month {
        Some(raw) => raw.parse(),
        None => Ok(YearMonth::of(Utc::now().date_naive())),
    }
}

/// The user a request acts for, resolved from the `x-user-id` header
pub struct CurrentUser(pub DomainUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                error_response(
                    "Rejected request",
                    DomainError::Unauthorized(format!("Missing {} header", USER_ID_HEADER)).into(),
                )
            })?;

        state
            .user_service
            .get_user(user_id)
            .await
            .map(CurrentUser)
            .map_err(|e| error_response("Failed to resolve calling user", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Feature, PlanTier};

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&DomainError::validation("bad")), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&DomainError::not_found("Goal 1")), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&DomainError::conflict("dup")), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&DomainError::FeatureLocked { feature: Feature::Calendar, tier: PlanTier::Bronze }.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&DomainError::Unauthorized("no header".into()).into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_for(&anyhow::anyhow!("disk full")), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_month_or_current() {
        assert_eq!(month_or_current(Some("2025-03")).unwrap(), YearMonth::new(2025, 3).unwrap());
        assert_eq!(
            month_or_current(None).unwrap(),
            YearMonth::of(Utc::now().date_naive())
        );
        let err = month_or_current(Some("March")).unwrap_err();
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_context_does_not_hide_domain_error() {
        let err = DomainError::not_found("Expense 9").context("loading expense");
        assert_eq!(status_for(&err), StatusCode::NOT_FOUND);
    }
}
