use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::info;

use super::repositories::{
    AppointmentRepository, BudgetRepository, ChatSessionRepository, ExpenseRepository,
    GoalRepository, IncomeRepository, NotificationRepository, UserRepository,
};
use crate::storage::traits::{
    AppointmentStorage, BudgetStorage, ChatSessionStorage, Connection, ExpenseStorage,
    GoalStorage, IncomeStorage, NotificationStorage, UserStorage,
};

/// DbConnection manages the SQLite pool and hands out repositories
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database {}", url);
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize a private in-memory database.
    ///
    /// A single connection that never expires keeps the memory database alive
    /// for the lifetime of the pool.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize a test database
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        Self::in_memory().await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                plan_tier TEXT NOT NULL,
                trial_ends_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS expenses (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                payment_method TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_expenses_user_date
            ON expenses(user_id, date DESC);
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS incomes (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                source TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                recurring INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_incomes_user_date
            ON incomes(user_id, date DESC);
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                time TEXT,
                location TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_appointments_user_date
            ON appointments(user_id, date);
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS budgets (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                month TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, category, month),
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS goals (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                target_amount REAL NOT NULL CHECK (target_amount > 0),
                current_amount REAL NOT NULL DEFAULT 0,
                deadline TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                message TEXT NOT NULL,
                reference TEXT,
                read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_notifications_dedup
            ON notifications(user_id, kind, reference);
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS chat_sessions (
                user_id TEXT PRIMARY KEY,
                state TEXT NOT NULL,
                pending TEXT,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );
            "#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(pool).await?;
        }

        Ok(())
    }
}

impl Connection for DbConnection {
    fn user_repository(&self) -> Arc<dyn UserStorage> {
        Arc::new(UserRepository::new(self.clone()))
    }

    fn expense_repository(&self) -> Arc<dyn ExpenseStorage> {
        Arc::new(ExpenseRepository::new(self.clone()))
    }

    fn income_repository(&self) -> Arc<dyn IncomeStorage> {
        Arc::new(IncomeRepository::new(self.clone()))
    }

    fn appointment_repository(&self) -> Arc<dyn AppointmentStorage> {
        Arc::new(AppointmentRepository::new(self.clone()))
    }

    fn budget_repository(&self) -> Arc<dyn BudgetStorage> {
        Arc::new(BudgetRepository::new(self.clone()))
    }

    fn goal_repository(&self) -> Arc<dyn GoalStorage> {
        Arc::new(GoalRepository::new(self.clone()))
    }

    fn notification_repository(&self) -> Arc<dyn NotificationStorage> {
        Arc::new(NotificationRepository::new(self.clone()))
    }

    fn chat_session_repository(&self) -> Arc<dyn ChatSessionStorage> {
        Arc::new(ChatSessionRepository::new(self.clone()))
    }
}
