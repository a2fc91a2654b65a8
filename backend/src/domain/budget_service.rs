//! Budget service domain logic for the finance tracker.
//!
//! A budget caps the spending of one category in one month. Setting a budget
//! for a (category, month) that already has one replaces its amount.

use anyhow::Result;
use chrono::Utc;
use shared::BudgetStatus;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::analytics::budget_status;
use crate::domain::commands::planning::UpsertBudgetCommand;
use crate::domain::errors::{clean_required, validate_amount, DomainError, MAX_CATEGORY_LEN};
use crate::domain::models::{DomainBudget, DomainUser, RecordFilter, YearMonth};
use crate::storage::traits::{BudgetStorage, Connection, ExpenseStorage};

#[derive(Clone)]
pub struct BudgetService {
    budget_repository: Arc<dyn BudgetStorage>,
    expense_repository: Arc<dyn ExpenseStorage>,
}

impl BudgetService {
    pub fn new(connection: &dyn Connection) -> Self {
        Self {
            budget_repository: connection.budget_repository(),
            expense_repository: connection.expense_repository(),
        }
    }

    pub async fn upsert_budget(&self, user: &DomainUser, command: UpsertBudgetCommand) -> Result<DomainBudget> {
        let category = clean_required("Category", &command.category, MAX_CATEGORY_LEN)?;
        let amount = validate_amount("Amount", command.amount)?;
        let month: YearMonth = command.month.trim().parse()?;
        let now = Utc::now();

        let budget = match self
            .budget_repository
            .find_budget(&user.id, &category, &month.to_string())
            .await?
        {
            Some(existing) => DomainBudget {
                amount,
                updated_at: now,
                ..existing
            },
            None => DomainBudget {
                id: Uuid::new_v4().to_string(),
                user_id: user.id.clone(),
                category,
                amount,
                month: month.to_string(),
                created_at: now,
                updated_at: now,
            },
        };

        self.budget_repository.upsert_budget(&budget).await?;
        info!("Set budget {} for {} in {} to {:.2}", budget.id, budget.category, budget.month, budget.amount);
        Ok(budget)
    }

    pub async fn list_budgets(&self, user: &DomainUser, month: YearMonth) -> Result<Vec<DomainBudget>> {
        self.budget_repository.list_budgets(&user.id, &month.to_string()).await
    }

    pub async fn delete_budget(&self, user: &DomainUser, budget_id: &str) -> Result<()> {
        if !self.budget_repository.delete_budget(&user.id, budget_id).await? {
            return Err(DomainError::not_found(format!("Budget {}", budget_id)));
        }
        Ok(())
    }

    /// Spending against every budget of `month`
    pub async fn status(&self, user: &DomainUser, month: YearMonth) -> Result<Vec<BudgetStatus>> {
        let budgets = self.list_budgets(user, month).await?;
        if budgets.is_empty() {
            return Ok(Vec::new());
        }
        let expenses = self
            .expense_repository
            .list_expenses(&user.id, &RecordFilter::between(month.first_day(), month.last_day()))
            .await?;
        Ok(budget_status(&budgets, &expenses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::DomainExpense;
    use crate::storage::MemoryConnection;
    use chrono::NaiveDate;
    use shared::{BudgetHealth, PlanTier};

    fn user() -> DomainUser {
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

    fn command(category: &str, amount: f64, month: &str) -> UpsertBudgetCommand {
        UpsertBudgetCommand {
            category: category.to_string(),
            amount,
            month: month.to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_budget() {
        let service = BudgetService::new(&MemoryConnection::new());
        let first = service.upsert_budget(&user(), command("Lazer", 200.0, "2025-06")).await.unwrap();
        let second = service.upsert_budget(&user(), command("LAZER", 350.0, "2025-06")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.category, "Lazer");
        let june = YearMonth::new(2025, 6).unwrap();
        let budgets = service.list_budgets(&user(), june).await.unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount, 350.0);
    }

    #[tokio::test]
    async fn test_upsert_validates_month_and_amount() {
        let service = BudgetService::new(&MemoryConnection::new());
        assert!(service.upsert_budget(&user(), command("Lazer", 100.0, "2025-13")).await.is_err());
        assert!(service.upsert_budget(&user(), command("Lazer", 100.0, "junho")).await.is_err());
        assert!(service.upsert_budget(&user(), command("Lazer", 0.0, "2025-06")).await.is_err());
    }

    #[tokio::test]
    async fn test_status_counts_only_the_month() {
        let conn = MemoryConnection::new();
        let service = BudgetService::new(&conn);
        service.upsert_budget(&user(), command("Lazer", 100.0, "2025-06")).await.unwrap();

        let now = Utc::now();
        for (id, date, amount) in [("e1", "2025-06-05", 70.0), ("e2", "2025-06-20", 40.0), ("e3", "2025-07-01", 500.0)] {
            conn.expense_repository()
                .store_expense(&DomainExpense {
                    id: id.to_string(),
                    user_id: "u1".to_string(),
                    amount,
                    category: "Lazer".to_string(),
                    description: "x".to_string(),
                    date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                    payment_method: None,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        let status = service.status(&user(), YearMonth::new(2025, 6).unwrap()).await.unwrap();
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].spent, 110.0);
        assert_eq!(status[0].remaining, -10.0);
        assert_eq!(status[0].status, BudgetHealth::Exceeded);
    }

    #[tokio::test]
    async fn test_delete_unknown_budget() {
        let service = BudgetService::new(&MemoryConnection::new());
        assert!(service.delete_budget(&user(), "missing").await.is_err());
    }
}
