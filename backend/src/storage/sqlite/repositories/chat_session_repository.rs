use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{ChatState, PendingAction};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::ChatSession;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::ChatSessionStorage;

/// Repository for per-user chat sessions. The pending draft is kept as JSON.
#[derive(Clone)]
pub struct ChatSessionRepository {
    db: DbConnection,
}

impl ChatSessionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<ChatSession> {
        let state: String = row.get("state");
        let pending: Option<String> = row.get("pending");
        let pending = match pending {
            Some(json) => Some(serde_json::from_str::<PendingAction>(&json)?),
            None => None,
        };

        Ok(ChatSession {
            user_id: row.get("user_id"),
            state: state.parse::<ChatState>().map_err(|e| anyhow!(e))?,
            pending,
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl ChatSessionStorage for ChatSessionRepository {
    async fn get_session(&self, user_id: &str) -> Result<Option<ChatSession>> {
        let row = sqlx::query("SELECT user_id, state, pending, updated_at FROM chat_sessions WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn save_session(&self, session: &ChatSession) -> Result<()> {
        let pending = session.pending.as_ref().map(serde_json::to_string).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO chat_sessions (user_id, state, pending, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                state = excluded.state,
                pending = excluded.pending,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&session.user_id)
        .bind(session.state.as_str())
        .bind(pending)
        .bind(session.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_session(&self, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM chat_sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}
