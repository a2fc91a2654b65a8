//! Shared fixtures for the SQLite repository tests

use chrono::Utc;
use shared::PlanTier;

use super::connection::DbConnection;
use super::repositories::UserRepository;
use crate::domain::models::DomainUser;
use crate::storage::traits::UserStorage;

/// Fresh in-memory database with one `ouro` user already stored
pub async fn db_with_user(user_id: &str) -> DbConnection {
    let db = DbConnection::init_test().await.expect("Failed to create test database");
    let now = Utc::now();
    UserRepository::new(db.clone())
        .store_user(&DomainUser {
            id: user_id.to_string(),
            name: "Test User".to_string(),
            email: format!("{}@example.com", user_id),
            plan_tier: PlanTier::Ouro,
            trial_ends_at: None,
            created_at: now,
            updated_at: now,
        })
        .await
        .expect("Failed to store test user");
    db
}
