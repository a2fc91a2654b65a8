use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::DomainGoal;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::GoalStorage;

/// Repository for savings goal operations
#[derive(Clone)]
pub struct GoalRepository {
    db: DbConnection,
}

impl GoalRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> DomainGoal {
        DomainGoal {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            target_amount: row.get("target_amount"),
            current_amount: row.get("current_amount"),
            deadline: row.get("deadline"),
            completed: row.get("completed"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl GoalStorage for GoalRepository {
    async fn store_goal(&self, goal: &DomainGoal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO goals (id, user_id, title, target_amount, current_amount, deadline, completed, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&goal.id)
        .bind(&goal.user_id)
        .bind(&goal.title)
        .bind(goal.target_amount)
        .bind(goal.current_amount)
        .bind(goal.deadline)
        .bind(goal.completed)
        .bind(goal.created_at)
        .bind(goal.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_goal(&self, user_id: &str, goal_id: &str) -> Result<Option<DomainGoal>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, target_amount, current_amount, deadline, completed, created_at, updated_at
            FROM goals
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(user_id)
        .bind(goal_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn list_goals(&self, user_id: &str) -> Result<Vec<DomainGoal>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, target_amount, current_amount, deadline, completed, created_at, updated_at
            FROM goals
            WHERE user_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(Self::map_row).collect())
    }

    async fn update_goal(&self, goal: &DomainGoal) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE goals
            SET title = ?, target_amount = ?, current_amount = ?, deadline = ?, completed = ?, updated_at = ?
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(&goal.title)
        .bind(goal.target_amount)
        .bind(goal.current_amount)
        .bind(goal.deadline)
        .bind(goal.completed)
        .bind(goal.updated_at)
        .bind(&goal.user_id)
        .bind(&goal.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM goals WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(goal_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::test_utils::db_with_user;
    use chrono::{Duration, NaiveDate, Utc};

    fn goal(id: &str, title: &str) -> DomainGoal {
        let now = Utc::now();
        DomainGoal {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: title.to_string(),
            target_amount: 5000.0,
            current_amount: 0.0,
            deadline: NaiveDate::from_ymd_opt(2025, 12, 31),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_list_goals_oldest_first() {
        let repo = GoalRepository::new(db_with_user("u1").await);
        let mut first = goal("g1", "Reserva de emergência");
        first.created_at = Utc::now() - Duration::days(3);
        repo.store_goal(&goal("g2", "Viagem")).await.unwrap();
        repo.store_goal(&first).await.unwrap();

        let ids: Vec<String> = repo.list_goals("u1").await.unwrap().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec!["g1", "g2"]);
    }

    #[tokio::test]
    async fn test_update_progress_and_completion() {
        let repo = GoalRepository::new(db_with_user("u1").await);
        let mut g = goal("g1", "Viagem");
        repo.store_goal(&g).await.unwrap();

        g.current_amount = 5000.0;
        g.completed = true;
        repo.update_goal(&g).await.unwrap();

        let loaded = repo.get_goal("u1", "g1").await.unwrap().unwrap();
        assert!(loaded.completed);
        assert_eq!(loaded.current_amount, 5000.0);
        assert_eq!(loaded.deadline, NaiveDate::from_ymd_opt(2025, 12, 31));

        assert!(repo.delete_goal("u1", "g1").await.unwrap());
        assert!(repo.get_goal("u1", "g1").await.unwrap().is_none());
    }
}
