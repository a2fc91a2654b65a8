use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::DomainBudget;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::BudgetStorage;

/// Repository for monthly category budgets
#[derive(Clone)]
pub struct BudgetRepository {
    db: DbConnection,
}

impl BudgetRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> DomainBudget {
        DomainBudget {
            id: row.get("id"),
            user_id: row.get("user_id"),
            category: row.get("category"),
            amount: row.get("amount"),
            month: row.get("month"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl BudgetStorage for BudgetRepository {
    async fn upsert_budget(&self, budget: &DomainBudget) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO budgets (id, user_id, category, amount, month, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, category, month) DO UPDATE SET
                amount = excluded.amount,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&budget.id)
        .bind(&budget.user_id)
        .bind(&budget.category)
        .bind(budget.amount)
        .bind(&budget.month)
        .bind(budget.created_at)
        .bind(budget.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_budget(&self, user_id: &str, budget_id: &str) -> Result<Option<DomainBudget>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, category, amount, month, created_at, updated_at
            FROM budgets
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(user_id)
        .bind(budget_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn find_budget(&self, user_id: &str, category: &str, month: &str) -> Result<Option<DomainBudget>> {
        let wanted = category.to_lowercase();
        Ok(self
            .list_budgets(user_id, month)
            .await?
            .into_iter()
            .find(|b| b.category.to_lowercase() == wanted))
    }

    async fn list_budgets(&self, user_id: &str, month: &str) -> Result<Vec<DomainBudget>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, category, amount, month, created_at, updated_at
            FROM budgets
            WHERE user_id = ? AND month = ?
            ORDER BY category ASC
            "#,
        )
        .bind(user_id)
        .bind(month)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::map_row).collect())
    }

    async fn delete_budget(&self, user_id: &str, budget_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(budget_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
