use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::NotificationKind;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::DomainNotification;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::NotificationStorage;

/// Repository for the notification history
#[derive(Clone)]
pub struct NotificationRepository {
    db: DbConnection,
}

impl NotificationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<DomainNotification> {
        let kind: String = row.get("kind");
        Ok(DomainNotification {
            id: row.get("id"),
            user_id: row.get("user_id"),
            kind: kind.parse::<NotificationKind>().map_err(|e| anyhow!(e))?,
            title: row.get("title"),
            message: row.get("message"),
            reference: row.get("reference"),
            read: row.get("read"),
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl NotificationStorage for NotificationRepository {
    async fn store_notification(&self, notification: &DomainNotification) -> Result<bool> {
        // The unique index on (user_id, kind, reference) turns repeats into no-ops
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO notifications (id, user_id, kind, title, message, reference, read, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&notification.id)
        .bind(&notification.user_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.reference)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_notifications(&self, user_id: &str, unread_only: bool, limit: u32) -> Result<Vec<DomainNotification>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, kind, title, message, reference, read, created_at
            FROM notifications
            WHERE user_id = ? AND (? = 0 OR read = 0)
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(limit as i64)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn count_unread(&self, user_id: &str) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = ? AND read = 0")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.0.max(0) as u64)
    }

    async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(notification_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE user_id = ? AND read = 0")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_notification(&self, user_id: &str, notification_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(notification_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::test_utils::db_with_user;
    use chrono::{Duration, Utc};

    fn notification(id: &str, kind: NotificationKind, reference: Option<&str>) -> DomainNotification {
        DomainNotification {
            id: id.to_string(),
            user_id: "u1".to_string(),
            kind,
            title: "Orçamento".to_string(),
            message: "Você usou 80% do orçamento".to_string(),
            reference: reference.map(str::to_string),
            read: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_reference_is_ignored() {
        let repo = NotificationRepository::new(db_with_user("u1").await);
        let first = notification("n1", NotificationKind::BudgetWarning, Some("Lazer:2025-06"));
        let again = notification("n2", NotificationKind::BudgetWarning, Some("Lazer:2025-06"));
        let other_kind = notification("n3", NotificationKind::BudgetExceeded, Some("Lazer:2025-06"));

        assert!(repo.store_notification(&first).await.unwrap());
        assert!(!repo.store_notification(&again).await.unwrap());
        assert!(repo.store_notification(&other_kind).await.unwrap());
        assert_eq!(repo.count_unread("u1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_notifications_without_reference_are_not_deduplicated() {
        let repo = NotificationRepository::new(db_with_user("u1").await);
        assert!(repo.store_notification(&notification("n1", NotificationKind::System, None)).await.unwrap());
        assert!(repo.store_notification(&notification("n2", NotificationKind::System, None)).await.unwrap());
        assert_eq!(repo.list_notifications("u1", false, 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_read_tracking() {
        let repo = NotificationRepository::new(db_with_user("u1").await);
        let mut older = notification("n1", NotificationKind::System, Some("a"));
        older.created_at = Utc::now() - Duration::minutes(1);
        repo.store_notification(&older).await.unwrap();
        repo.store_notification(&notification("n2", NotificationKind::System, Some("b"))).await.unwrap();
        repo.store_notification(&notification("n3", NotificationKind::System, Some("c"))).await.unwrap();

        assert!(repo.mark_read("u1", "n2").await.unwrap());
        assert!(!repo.mark_read("u1", "missing").await.unwrap());

        let unread = repo.list_notifications("u1", true, 10).await.unwrap();
        let ids: Vec<&str> = unread.iter().map(|n| n.id.as_str()).collect();
        assert!(ids.contains(&"n1") && ids.contains(&"n3"));
        assert_eq!(unread.last().map(|n| n.id.as_str()), Some("n1"));

        assert_eq!(repo.mark_all_read("u1").await.unwrap(), 2);
        assert_eq!(repo.count_unread("u1").await.unwrap(), 0);
        assert_eq!(repo.list_notifications("u1", false, 2).await.unwrap().len(), 2);

        assert!(repo.delete_notification("u1", "n1").await.unwrap());
    }
}
