use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{DomainIncome, RecordFilter};
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::IncomeStorage;

/// Repository for income operations
#[derive(Clone)]
pub struct IncomeRepository {
    db: DbConnection,
}

impl IncomeRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> DomainIncome {
        DomainIncome {
            id: row.get("id"),
            user_id: row.get("user_id"),
            amount: row.get("amount"),
            source: row.get("source"),
            description: row.get("description"),
            date: row.get("date"),
            recurring: row.get("recurring"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl IncomeStorage for IncomeRepository {
    async fn store_income(&self, income: &DomainIncome) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO incomes (id, user_id, amount, source, description, date, recurring, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&income.id)
        .bind(&income.user_id)
        .bind(income.amount)
        .bind(&income.source)
        .bind(&income.description)
        .bind(income.date)
        .bind(income.recurring)
        .bind(income.created_at)
        .bind(income.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_income(&self, user_id: &str, income_id: &str) -> Result<Option<DomainIncome>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, amount, source, description, date, recurring, created_at, updated_at
            FROM incomes
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(user_id)
        .bind(income_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn list_incomes(&self, user_id: &str, filter: &RecordFilter) -> Result<Vec<DomainIncome>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, amount, source, description, date, recurring, created_at, updated_at
            FROM incomes
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
            .filter(|i| filter.matches(i.date, &i.source))
            .collect())
    }

    async fn update_income(&self, income: &DomainIncome) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE incomes
            SET amount = ?, source = ?, description = ?, date = ?, recurring = ?, updated_at = ?
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(income.amount)
        .bind(&income.source)
        .bind(&income.description)
        .bind(income.date)
        .bind(income.recurring)
        .bind(income.updated_at)
        .bind(&income.user_id)
        .bind(&income.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_income(&self, user_id: &str, income_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM incomes WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(income_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
