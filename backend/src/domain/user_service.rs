//! User service domain logic for the finance tracker.
//!
//! Users register with a name and email and start on a time-limited trial.
//! Plan changes are applied here; feature gating itself lives in `plan`.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use shared::{FeatureAccess, PlanTier};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::commands::users::{CreateUserCommand, UpdateUserCommand};
use crate::domain::errors::{clean_required, DomainError, MAX_TEXT_LEN};
use crate::domain::models::DomainUser;
use crate::domain::plan;
use crate::storage::traits::{Connection, UserStorage};

const MAX_NAME_LEN: usize = 100;

#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserStorage>,
    trial_days: i64,
}

impl UserService {
    pub fn new(connection: &dyn Connection, trial_days: i64) -> Self {
        Self {
            user_repository: connection.user_repository(),
            trial_days,
        }
    }

    pub async fn create_user(&self, command: CreateUserCommand) -> Result<DomainUser> {
        let name = clean_required("Name", &command.name, MAX_NAME_LEN)?;
        let email = normalize_email(&command.email)?;

        if self.user_repository.get_user_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict(format!("Email {} is already registered", email)));
        }

        let now = Utc::now();
        let user = DomainUser {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            plan_tier: PlanTier::Trial,
            trial_ends_at: Some(now + Duration::days(self.trial_days)),
            created_at: now,
            updated_at: now,
        };
        self.user_repository.store_user(&user).await?;

        info!("Created user {} on a {}-day trial", user.id, self.trial_days);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<DomainUser> {
        self.user_repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User {}", user_id)))
    }

    pub async fn update_profile(&self, user_id: &str, command: UpdateUserCommand) -> Result<DomainUser> {
        let mut user = self.get_user(user_id).await?;

        if let Some(name) = command.name {
            user.name = clean_required("Name", &name, MAX_NAME_LEN)?;
        }
        if let Some(email) = command.email {
            let email = normalize_email(&email)?;
            if email != user.email {
                if let Some(other) = self.user_repository.get_user_by_email(&email).await? {
                    if other.id != user.id {
                        return Err(DomainError::conflict(format!("Email {} is already registered", email)));
                    }
                }
                user.email = email;
            }
        }

        user.updated_at = Utc::now();
        self.user_repository.update_user(&user).await?;
        Ok(user)
    }

    /// Move the user to another tier. Leaving `trial` ends the trial; entering it
    /// again starts a fresh one.
    pub async fn update_plan(&self, user_id: &str, tier: PlanTier) -> Result<DomainUser> {
        let mut user = self.get_user(user_id).await?;
        let now = Utc::now();

        user.trial_ends_at = match (user.plan_tier, tier) {
            (PlanTier::Trial, PlanTier::Trial) => user.trial_ends_at,
            (_, PlanTier::Trial) => Some(now + Duration::days(self.trial_days)),
            _ => None,
        };
        info!("User {} plan {} -> {}", user.id, user.plan_tier, tier);
        user.plan_tier = tier;
        user.updated_at = now;

        self.user_repository.update_user(&user).await?;
        Ok(user)
    }

    pub fn features(&self, user: &DomainUser, now: DateTime<Utc>) -> FeatureAccess {
        plan::feature_access(user, now)
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = clean_required("Email", email, MAX_TEXT_LEN)?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace) => {
            Ok(email)
        }
        _ => Err(DomainError::validation(format!("Invalid email: {}", email))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryConnection;

    fn service() -> UserService {
        UserService::new(&MemoryConnection::new(), 7)
    }

    fn create(name: &str, email: &str) -> CreateUserCommand {
        CreateUserCommand {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_new_user_starts_on_trial() {
        let service = service();
        let user = service.create_user(create(" Ana ", "Ana@Example.com")).await.unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.plan_tier, PlanTier::Trial);

        let access = service.features(&user, Utc::now());
        assert_eq!(access.trial_days_remaining, Some(7));
        assert!(access.calendar);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let service = service();
        service.create_user(create("Ana", "ana@example.com")).await.unwrap();
        let err = service.create_user(create("Outra", "ANA@example.com")).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let service = service();
        assert!(service.create_user(create("", "a@b.com")).await.is_err());
        assert!(service.create_user(create("Ana", "not-an-email")).await.is_err());
        assert!(service.create_user(create("Ana", "@b.com")).await.is_err());
    }

    #[tokio::test]
    async fn test_upgrade_clears_trial() {
        let service = service();
        let user = service.create_user(create("Ana", "ana@example.com")).await.unwrap();

        let upgraded = service.update_plan(&user.id, PlanTier::Ouro).await.unwrap();
        assert_eq!(upgraded.plan_tier, PlanTier::Ouro);
        assert!(upgraded.trial_ends_at.is_none());

        let downgraded = service.update_plan(&user.id, PlanTier::Bronze).await.unwrap();
        let access = service.features(&downgraded, Utc::now());
        assert!(!access.income_tracking);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let service = service();
        let user = service.create_user(create("Ana", "ana@example.com")).await.unwrap();
        service.create_user(create("Bia", "bia@example.com")).await.unwrap();

        let updated = service
            .update_profile(&user.id, UpdateUserCommand { name: Some("Ana Maria".to_string()), email: None })
            .await
            .unwrap();
        assert_eq!(updated.name, "Ana Maria");

        let taken = service
            .update_profile(&user.id, UpdateUserCommand { name: None, email: Some("bia@example.com".to_string()) })
            .await;
        assert!(taken.is_err());
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let err = service().get_user("missing").await.unwrap_err();
        assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::NotFound(_))));
    }
}
