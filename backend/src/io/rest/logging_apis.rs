use axum::{http::StatusCode, response::Json, routing::post, Router};
use serde::Serialize;
use shared::LogEntry;
use tracing::{debug, error, info, warn};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(log_message))
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub success: bool,
}

/// Re-emit a client log line at the requested level
pub async fn log_message(Json(request): Json<LogEntry>) -> Result<Json<LogResponse>, StatusCode> {
    let component = request.component.as_deref().unwrap_or("client");
    let message = format!("[{}] {}", component, request.message);

    match request.level.to_lowercase().as_str() {
        "debug" => debug!(target: "client", "{}", message),
        "warn" | "warning" => warn!(target: "client", "{}", message),
        "error" => error!(target: "client", "{}", message),
        _ => info!(target: "client", "{}", message),
    }

    Ok(Json(LogResponse { success: true }))
}
