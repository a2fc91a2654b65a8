use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{DomainExpense, RecordFilter};
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::ExpenseStorage;

/// Repository for expense operations
#[derive(Clone)]
pub struct ExpenseRepository {
    db: DbConnection,
}

impl ExpenseRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> DomainExpense {
        DomainExpense {
            id: row.get("id"),
            user_id: row.get("user_id"),
            amount: row.get("amount"),
            category: row.get("category"),
            description: row.get("description"),
            date: row.get("date"),
            payment_method: row.get("payment_method"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl ExpenseStorage for ExpenseRepository {
    async fn store_expense(&self, expense: &DomainExpense) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO expenses (id, user_id, amount, category, description, date, payment_method, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.user_id)
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(expense.date)
        .bind(&expense.payment_method)
        .bind(expense.created_at)
        .bind(expense.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_expense(&self, user_id: &str, expense_id: &str) -> Result<Option<DomainExpense>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, amount, category, description, date, payment_method, created_at, updated_at
            FROM expenses
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(user_id)
        .bind(expense_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn list_expenses(&self, user_id: &str, filter: &RecordFilter) -> Result<Vec<DomainExpense>> {
        // Date bounds are pushed to SQL; the category comparison needs
        // unicode case folding, which SQLite's lower() does not do.
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, amount, category, description, date, payment_method, created_at, updated_at
            FROM expenses
            WHERE user_id = ?
              AND (? IS NULL OR date >= ?)
              AND (? IS NULL OR date <= ?)
            ORDER BY date DESC, created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.start_date)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.end_date)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(Self::map_row)
            .filter(|e| filter.matches(e.date, &e.category))
            .collect())
    }

    async fn update_expense(&self, expense: &DomainExpense) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE expenses
            SET amount = ?, category = ?, description = ?, date = ?, payment_method = ?, updated_at = ?
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(expense.date)
        .bind(&expense.payment_method)
        .bind(expense.updated_at)
        .bind(&expense.user_id)
        .bind(&expense.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_expense(&self, user_id: &str, expense_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(expense_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
