//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::models::{
    ChatSession, DomainAppointment, DomainBudget, DomainExpense, DomainGoal, DomainIncome,
    DomainNotification, DomainUser, RecordFilter,
};

/// Trait defining the interface for user storage operations
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Store a new user
    async fn store_user(&self, user: &DomainUser) -> Result<()>;

    /// Retrieve a user by ID
    async fn get_user(&self, user_id: &str) -> Result<Option<DomainUser>>;

    /// Retrieve a user by email, compared case-insensitively
    async fn get_user_by_email(&self, email: &str) -> Result<Option<DomainUser>>;

    /// Update an existing user
    async fn update_user(&self, user: &DomainUser) -> Result<()>;
}

/// Trait defining the interface for expense storage operations
#[async_trait]
pub trait ExpenseStorage: Send + Sync {
    async fn store_expense(&self, expense: &DomainExpense) -> Result<()>;

    async fn get_expense(&self, user_id: &str, expense_id: &str) -> Result<Option<DomainExpense>>;

    /// List expenses matching the filter, newest first (date desc, created_at desc)
    async fn list_expenses(&self, user_id: &str, filter: &RecordFilter) -> Result<Vec<DomainExpense>>;

    async fn update_expense(&self, expense: &DomainExpense) -> Result<()>;

    /// Returns true if the expense was found and deleted
    async fn delete_expense(&self, user_id: &str, expense_id: &str) -> Result<bool>;
}

/// Trait defining the interface for income storage operations
#[async_trait]
pub trait IncomeStorage: Send + Sync {
    async fn store_income(&self, income: &DomainIncome) -> Result<()>;

    async fn get_income(&self, user_id: &str, income_id: &str) -> Result<Option<DomainIncome>>;

    /// List incomes matching the filter (category matches the source), newest first
    async fn list_incomes(&self, user_id: &str, filter: &RecordFilter) -> Result<Vec<DomainIncome>>;

    async fn update_income(&self, income: &DomainIncome) -> Result<()>;

    async fn delete_income(&self, user_id: &str, income_id: &str) -> Result<bool>;
}

/// Trait defining the interface for appointment storage operations
#[async_trait]
pub trait AppointmentStorage: Send + Sync {
    async fn store_appointment(&self, appointment: &DomainAppointment) -> Result<()>;

    async fn get_appointment(&self, user_id: &str, appointment_id: &str) -> Result<Option<DomainAppointment>>;

    /// List appointments with `start <= date <= end`, in calendar order
    async fn list_appointments(&self, user_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DomainAppointment>>;

    async fn update_appointment(&self, appointment: &DomainAppointment) -> Result<()>;

    async fn delete_appointment(&self, user_id: &str, appointment_id: &str) -> Result<bool>;
}

/// Trait defining the interface for budget storage operations
#[async_trait]
pub trait BudgetStorage: Send + Sync {
    /// Insert or replace the budget of (user, category, month)
    async fn upsert_budget(&self, budget: &DomainBudget) -> Result<()>;

    async fn get_budget(&self, user_id: &str, budget_id: &str) -> Result<Option<DomainBudget>>;

    /// Budget of a category for a month, category compared case-insensitively
    async fn find_budget(&self, user_id: &str, category: &str, month: &str) -> Result<Option<DomainBudget>>;

    /// Budgets of a month ordered by category
    async fn list_budgets(&self, user_id: &str, month: &str) -> Result<Vec<DomainBudget>>;

    async fn delete_budget(&self, user_id: &str, budget_id: &str) -> Result<bool>;
}

/// Trait defining the interface for goal storage operations
#[async_trait]
pub trait GoalStorage: Send + Sync {
    async fn store_goal(&self, goal: &DomainGoal) -> Result<()>;

    async fn get_goal(&self, user_id: &str, goal_id: &str) -> Result<Option<DomainGoal>>;

    /// Goals ordered by creation time
    async fn list_goals(&self, user_id: &str) -> Result<Vec<DomainGoal>>;

    async fn update_goal(&self, goal: &DomainGoal) -> Result<()>;

    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<bool>;
}

/// Trait defining the interface for notification history storage operations
#[async_trait]
pub trait NotificationStorage: Send + Sync {
    /// Store a notification. Returns false without storing when a notification
    /// with the same (user, kind, reference) already exists.
    async fn store_notification(&self, notification: &DomainNotification) -> Result<bool>;

    /// Newest first
    async fn list_notifications(&self, user_id: &str, unread_only: bool, limit: u32) -> Result<Vec<DomainNotification>>;

    async fn count_unread(&self, user_id: &str) -> Result<u64>;

    async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<bool>;

    /// Returns the number of notifications that changed
    async fn mark_all_read(&self, user_id: &str) -> Result<u64>;

    async fn delete_notification(&self, user_id: &str, notification_id: &str) -> Result<bool>;
}

/// Trait defining the interface for chat session storage operations
#[async_trait]
pub trait ChatSessionStorage: Send + Sync {
    async fn get_session(&self, user_id: &str) -> Result<Option<ChatSession>>;

    async fn save_session(&self, session: &ChatSession) -> Result<()>;

    async fn delete_session(&self, user_id: &str) -> Result<()>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type (SQLite, in-memory)
/// and provides factory methods for creating repositories. This allows the domain
/// layer to work with any storage backend without knowing the implementation details.
pub trait Connection: Send + Sync {
    fn user_repository(&self) -> Arc<dyn UserStorage>;
    fn expense_repository(&self) -> Arc<dyn ExpenseStorage>;
    fn income_repository(&self) -> Arc<dyn IncomeStorage>;
    fn appointment_repository(&self) -> Arc<dyn AppointmentStorage>;
    fn budget_repository(&self) -> Arc<dyn BudgetStorage>;
    fn goal_repository(&self) -> Arc<dyn GoalStorage>;
    fn notification_repository(&self) -> Arc<dyn NotificationStorage>;
    fn chat_session_repository(&self) -> Arc<dyn ChatSessionStorage>;
}
