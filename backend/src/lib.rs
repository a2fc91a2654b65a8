//! # Finance Tracker Backend
//!
//! Personal finance tracking service: expenses, incomes, budgets, savings
//! goals, a calendar of appointments, notifications, analytics and a chat
//! assistant that turns Portuguese messages into records.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, completion model client)
//!     ↓
//! Domain Layer (Business logic, services)
//!     ↓
//! Storage Layer (SQLite or in-memory repositories)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Initialize and configure the application state
//! - Set up the REST API router with CORS and request tracing
//! - Wire services to the configured storage backend

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::domain::{
    AnalyticsService, BudgetService, CalendarService, ChatService, CompletionClient, ExpenseService,
    GoalService, IncomeService, NotificationService, UserService,
};
use crate::io::llm::OpenAiClient;
use crate::io::rest::{
    analytics_apis, budget_apis, calendar_apis, chat_apis, expense_apis, goal_apis, income_apis,
    logging_apis, notification_apis, user_apis, USER_ID_HEADER,
};
use crate::storage::{Connection, DbConnection, MemoryConnection};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub expense_service: ExpenseService,
    pub income_service: IncomeService,
    pub calendar_service: CalendarService,
    pub budget_service: BudgetService,
    pub goal_service: GoalService,
    pub notification_service: NotificationService,
    pub analytics_service: AnalyticsService,
    pub chat_service: ChatService,
}

/// Wire every service to `connection`
pub fn build_state(
    connection: &dyn Connection,
    trial_days: i64,
    completion_client: Option<Arc<dyn CompletionClient>>,
) -> AppState {
    let notification_service = NotificationService::new(connection);
    let expense_service = ExpenseService::new(connection, notification_service.clone());
    let income_service = IncomeService::new(connection);
    let calendar_service = CalendarService::new(connection);
    let chat_service = ChatService::new(
        connection,
        expense_service.clone(),
        income_service.clone(),
        calendar_service.clone(),
        completion_client,
    );

    AppState {
        user_service: UserService::new(connection, trial_days),
        budget_service: BudgetService::new(connection),
        goal_service: GoalService::new(connection, notification_service.clone()),
        analytics_service: AnalyticsService::new(connection),
        expense_service,
        income_service,
        calendar_service,
        notification_service,
        chat_service,
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let completion_client: Option<Arc<dyn CompletionClient>> = match &config.llm {
        Some(llm) => {
            info!("Chat assistant uses model {} at {}", llm.model, llm.api_url);
            Some(Arc::new(OpenAiClient::new(llm)?))
        }
        None => {
            info!("No completion model configured, chat assistant runs on rules only");
            None
        }
    };

    let state = match config.storage_backend {
        StorageBackend::Sqlite => {
            info!("Setting up database at {}", config.database_url);
            let connection = DbConnection::new(&config.database_url).await?;
            build_state(&connection, config.trial_days, completion_client)
        }
        StorageBackend::Memory => {
            info!("Setting up in-memory store with demo data");
            let connection = MemoryConnection::with_demo_data().await?;
            build_state(&connection, config.trial_days, completion_client)
        }
    };

    info!("Application state ready");
    Ok(state)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)]);

    let api_routes = Router::new()
        .route("/health", get(health))
        .nest("/users", user_apis::router())
        .nest("/expenses", expense_apis::router())
        .nest("/incomes", income_apis::router())
        .nest("/appointments", calendar_apis::appointment_router())
        .nest("/calendar", calendar_apis::router())
        .nest("/budgets", budget_apis::router())
        .nest("/goals", goal_apis::router())
        .nest("/notifications", notification_apis::router())
        .nest("/analytics", analytics_apis::router())
        .nest("/chat", chat_apis::router())
        .nest("/logs", logging_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
