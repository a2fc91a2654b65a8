//! Expense service domain logic for the finance tracker.
//!
//! Expenses are available on every plan. Saving an expense re-checks the
//! budget of its category and month so threshold notifications stay current.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::commands::ledger::{CreateExpenseCommand, RecordListQuery, UpdateExpenseCommand};
use crate::domain::errors::{
    clean_optional, clean_required, validate_amount, DomainError, MAX_CATEGORY_LEN, MAX_TEXT_LEN,
};
use crate::domain::models::{DomainExpense, DomainUser, RecordFilter, YearMonth};
use crate::domain::notification_service::NotificationService;
use crate::domain::pagination::{paginate, Page};
use crate::storage::traits::{Connection, ExpenseStorage};

#[derive(Clone)]
pub struct ExpenseService {
    expense_repository: Arc<dyn ExpenseStorage>,
    notification_service: NotificationService,
}

impl ExpenseService {
    pub fn new(connection: &dyn Connection, notification_service: NotificationService) -> Self {
        Self {
            expense_repository: connection.expense_repository(),
            notification_service,
        }
    }

    pub async fn create_expense(&self, user: &DomainUser, command: CreateExpenseCommand) -> Result<DomainExpense> {
        let now = Utc::now();
        let expense = DomainExpense {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            amount: validate_amount("Amount", command.amount)?,
            category: clean_required("Category", &command.category, MAX_CATEGORY_LEN)?,
            description: clean_required("Description", &command.description, MAX_TEXT_LEN)?,
            date: command.date.unwrap_or_else(|| now.date_naive()),
            payment_method: clean_optional("Payment method", command.payment_method, MAX_CATEGORY_LEN)?,
            created_at: now,
            updated_at: now,
        };

        self.expense_repository.store_expense(&expense).await?;
        info!("Created expense {} ({:.2} {}) for user {}", expense.id, expense.amount, expense.category, user.id);

        self.after_write(&expense).await;
        Ok(expense)
    }

    pub async fn get_expense(&self, user: &DomainUser, expense_id: &str) -> Result<DomainExpense> {
        self.expense_repository
            .get_expense(&user.id, expense_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Expense {}", expense_id)))
    }

    pub async fn update_expense(&self, user: &DomainUser, expense_id: &str, command: UpdateExpenseCommand) -> Result<DomainExpense> {
        let mut expense = self.get_expense(user, expense_id).await?;

        if let Some(amount) = command.amount {
            expense.amount = validate_amount("Amount", amount)?;
        }
        if let Some(category) = command.category {
            expense.category = clean_required("Category", &category, MAX_CATEGORY_LEN)?;
        }
        if let Some(description) = command.description {
            expense.description = clean_required("Description", &description, MAX_TEXT_LEN)?;
        }
        if let Some(date) = command.date {
            expense.date = date;
        }
        if command.payment_method.is_some() {
            expense.payment_method = clean_optional("Payment method", command.payment_method, MAX_CATEGORY_LEN)?;
        }
        expense.updated_at = Utc::now();

        self.expense_repository.update_expense(&expense).await?;
        self.after_write(&expense).await;
        Ok(expense)
    }

    pub async fn delete_expense(&self, user: &DomainUser, expense_id: &str) -> Result<()> {
        if !self.expense_repository.delete_expense(&user.id, expense_id).await? {
            return Err(DomainError::not_found(format!("Expense {}", expense_id)));
        }
        info!("Deleted expense {} for user {}", expense_id, user.id);
        Ok(())
    }

    pub async fn list_expenses(&self, user: &DomainUser, query: RecordListQuery) -> Result<Page<DomainExpense>> {
        let filter = record_filter(&query)?;
        let expenses = self.expense_repository.list_expenses(&user.id, &filter).await?;
        paginate(expenses, query.after.as_deref(), query.limit, |e| e.id.as_str())
    }

    /// All expenses matching `filter`, unpaginated
    pub async fn expenses_matching(&self, user: &DomainUser, filter: &RecordFilter) -> Result<Vec<DomainExpense>> {
        self.expense_repository.list_expenses(&user.id, filter).await
    }

    async fn after_write(&self, expense: &DomainExpense) {
        if let Err(e) = self
            .notification_service
            .check_budget(&expense.user_id, &expense.category, YearMonth::of(expense.date))
            .await
        {
            warn!("Budget check failed for expense {}: {}", expense.id, e);
        }
    }
}

/// Validate list query bounds and turn them into a storage filter
pub fn record_filter(query: &RecordListQuery) -> Result<RecordFilter> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(DomainError::validation("start_date must not be after end_date"));
        }
    }
    Ok(RecordFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        category: query
            .category
            .as_ref()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::DomainBudget;
    use crate::storage::MemoryConnection;
    use chrono::NaiveDate;
    use shared::{NotificationKind, PlanTier};

    fn bronze_user() -> DomainUser {
        let now = Utc::now();
        DomainUser {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            plan_tier: PlanTier::Bronze,
            trial_ends_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn setup() -> (MemoryConnection, ExpenseService) {
        let conn = MemoryConnection::new();
        let service = ExpenseService::new(&conn, NotificationService::new(&conn));
        (conn, service)
    }

    fn command(amount: f64, category: &str, date: Option<NaiveDate>) -> CreateExpenseCommand {
        CreateExpenseCommand {
            amount,
            category: category.to_string(),
            description: "Mercado".to_string(),
            date,
            payment_method: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_date_to_today() {
        let (_, service) = setup();
        let expense = service.create_expense(&bronze_user(), command(25.0, " Alimentação ", None)).await.unwrap();
        assert_eq!(expense.date, Utc::now().date_naive());
        assert_eq!(expense.category, "Alimentação");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let (_, service) = setup();
        let user = bronze_user();
        assert!(service.create_expense(&user, command(0.0, "Lazer", None)).await.is_err());
        assert!(service.create_expense(&user, command(-5.0, "Lazer", None)).await.is_err());
        assert!(service.create_expense(&user, command(5.0, "  ", None)).await.is_err());
    }

    #[tokio::test]
    async fn test_list_pages_with_cursor() {
        let (_, service) = setup();
        let user = bronze_user();
        for day in 1..=5 {
            service
                .create_expense(&user, command(10.0, "Lazer", NaiveDate::from_ymd_opt(2025, 6, day)))
                .await
                .unwrap();
        }

        let first = service
            .list_expenses(&user, RecordListQuery { limit: Some(2), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.items[0].date, NaiveDate::from_ymd_opt(2025, 6, 5).unwrap());
        assert!(first.has_more);

        let second = service
            .list_expenses(&user, RecordListQuery { limit: Some(10), after: first.next_cursor.clone(), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(second.items.len(), 3);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn test_list_rejects_inverted_range() {
        let (_, service) = setup();
        let query = RecordListQuery {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 10),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..Default::default()
        };
        assert!(service.list_expenses(&bronze_user(), query).await.is_err());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (_, service) = setup();
        let user = bronze_user();
        let expense = service.create_expense(&user, command(25.0, "Lazer", None)).await.unwrap();

        let updated = service
            .update_expense(
                &user,
                &expense.id,
                UpdateExpenseCommand { amount: Some(40.0), payment_method: Some("pix".to_string()), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.amount, 40.0);
        assert_eq!(updated.category, "Lazer");
        assert_eq!(updated.payment_method.as_deref(), Some("pix"));

        service.delete_expense(&user, &expense.id).await.unwrap();
        let err = service.get_expense(&user, &expense.id).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_crossing_budget_emits_notification() {
        let (conn, service) = setup();
        let user = bronze_user();
        let today = Utc::now().date_naive();
        let now = Utc::now();
        conn.budget_repository()
            .upsert_budget(&DomainBudget {
                id: "b1".to_string(),
                user_id: "u1".to_string(),
                category: "Lazer".to_string(),
                amount: 100.0,
                month: YearMonth::of(today).to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        service.create_expense(&user, command(85.0, "lazer", Some(today))).await.unwrap();
        let notifications = conn.notification_repository().list_notifications("u1", false, 10).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::BudgetWarning);
    }
}
