use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::PlanTier;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::DomainUser;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::UserStorage;

/// Repository for user operations
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<DomainUser> {
        let tier: String = row.get("plan_tier");
        Ok(DomainUser {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            plan_tier: tier.parse::<PlanTier>().map_err(|e| anyhow!(e))?,
            trial_ends_at: row.get("trial_ends_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl UserStorage for UserRepository {
    async fn store_user(&self, user: &DomainUser) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, plan_tier, trial_ends_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(user.email.to_lowercase())
        .bind(user.plan_tier.as_str())
        .bind(user.trial_ends_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<DomainUser>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, plan_tier, trial_ends_at, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<DomainUser>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, plan_tier, trial_ends_at, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn update_user(&self, user: &DomainUser) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, email = ?, plan_tier = ?, trial_ends_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(user.email.to_lowercase())
        .bind(user.plan_tier.as_str())
        .bind(user.trial_ends_at)
        .bind(user.updated_at)
        .bind(&user.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}
