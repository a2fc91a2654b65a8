//! # Domain Module
//!
//! Contains all business logic for the finance tracker.
//!
//! Services here receive the calling user, validate input, apply plan gating
//! and talk to storage only through the traits in `crate::storage::traits`.
//! Nothing in this module knows about HTTP or about a concrete database.
//!
//! ## Module Organization
//!
//! - **user_service**: Registration, profile edits and plan changes
//! - **expense_service** / **income_service**: Ledger CRUD with filtered, paginated listings
//! - **calendar**: Appointments, the month grid and upcoming appointments
//! - **budget_service**: Monthly category budgets and their spending status
//! - **goal_service**: Savings goals and contributions
//! - **notification_service**: Budget, goal, reminder and trial notices plus the inbox
//! - **analytics** / **analytics_service**: Pure aggregations and the service that feeds them
//! - **chat**: Rule-based conversational entry with an optional completion model
//! - **plan**: Feature gating by plan tier
//!
//! ## Business Rules
//!
//! - Amounts are positive; texts are trimmed and non-empty
//! - Bronze users keep expenses, budgets, goals and the dashboard; income
//!   tracking, the calendar and advanced analytics need Ouro or an active trial
//! - A trial past its end date counts as bronze
//! - Budget notices fire at 80% and above 100% of the budget, once per
//!   category and month
//!
//! ## Errors
//!
//! Services return `anyhow::Result`. Failures callers should tell apart are a
//! [`errors::DomainError`] inside the `anyhow::Error`, which the REST layer
//! downcasts to choose a status code.

pub mod analytics;
pub mod analytics_service;
pub mod budget_service;
pub mod calendar;
pub mod chat;
pub mod commands;
pub mod errors;
pub mod expense_service;
pub mod goal_service;
pub mod income_service;
pub mod models;
pub mod notification_service;
pub mod pagination;
pub mod plan;
pub mod user_service;

pub use analytics_service::AnalyticsService;
pub use budget_service::BudgetService;
pub use calendar::CalendarService;
pub use chat::{ChatService, CompletionClient};
pub use errors::DomainError;
pub use expense_service::ExpenseService;
pub use goal_service::GoalService;
pub use income_service::IncomeService;
pub use notification_service::NotificationService;
pub use user_service::UserService;
