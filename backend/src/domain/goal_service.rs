//! Goal service domain logic for the finance tracker.
//!
//! ## Business Rules
//!
//! - Target amounts must be positive; saved amounts cannot be negative
//! - Contributions must be positive
//! - A goal completes as soon as the saved amount reaches the target, and a
//!   single `goal_reached` notification is emitted for it
//! - Completed goals accept no further contributions
//! - Title limits: 1-256 characters

use anyhow::Result;
use chrono::Utc;
use shared::NotificationKind;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::analytics::round2;
use crate::domain::commands::planning::{CreateGoalCommand, UpdateGoalCommand};
use crate::domain::errors::{clean_required, validate_amount, DomainError, MAX_TEXT_LEN};
use crate::domain::models::{DomainGoal, DomainUser, NewNotification};
use crate::domain::notification_service::NotificationService;
use crate::storage::traits::{Connection, GoalStorage};

#[derive(Clone)]
pub struct GoalService {
    goal_repository: Arc<dyn GoalStorage>,
    notification_service: NotificationService,
}

impl GoalService {
    pub fn new(connection: &dyn Connection, notification_service: NotificationService) -> Self {
        Self {
            goal_repository: connection.goal_repository(),
            notification_service,
        }
    }

    pub async fn create_goal(&self, user: &DomainUser, command: CreateGoalCommand) -> Result<DomainGoal> {
        info!("Creating goal for user {}: {:?}", user.id, command);
        let title = clean_required("Title", &command.title, MAX_TEXT_LEN)?;
        let target_amount = validate_amount("Target amount", command.target_amount)?;
        if !command.current_amount.is_finite() || command.current_amount < 0.0 {
            return Err(DomainError::validation("Current amount cannot be negative"));
        }

        let now = Utc::now();
        let mut goal = DomainGoal {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            title,
            target_amount,
            current_amount: command.current_amount,
            deadline: command.deadline,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        goal.completed = goal.is_reached();

        self.goal_repository.store_goal(&goal).await?;
        if goal.completed {
            self.announce_completion(&goal).await;
        }
        Ok(goal)
    }

    pub async fn get_goal(&self, user: &DomainUser, goal_id: &str) -> Result<DomainGoal> {
        self.goal_repository
            .get_goal(&user.id, goal_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Goal {}", goal_id)))
    }

    pub async fn list_goals(&self, user: &DomainUser) -> Result<Vec<DomainGoal>> {
        self.goal_repository.list_goals(&user.id).await
    }

    pub async fn update_goal(&self, user: &DomainUser, goal_id: &str, command: UpdateGoalCommand) -> Result<DomainGoal> {
        let mut goal = self.get_goal(user, goal_id).await?;

        if let Some(title) = command.title {
            goal.title = clean_required("Title", &title, MAX_TEXT_LEN)?;
        }
        if let Some(target_amount) = command.target_amount {
            goal.target_amount = validate_amount("Target amount", target_amount)?;
        }
        if command.deadline.is_some() {
            goal.deadline = command.deadline;
        }

        let newly_completed = !goal.completed && goal.is_reached();
        goal.completed = goal.is_reached();
        goal.updated_at = Utc::now();

        self.goal_repository.update_goal(&goal).await?;
        if newly_completed {
            self.announce_completion(&goal).await;
        }
        Ok(goal)
    }

    pub async fn delete_goal(&self, user: &DomainUser, goal_id: &str) -> Result<()> {
        if !self.goal_repository.delete_goal(&user.id, goal_id).await? {
            return Err(DomainError::not_found(format!("Goal {}", goal_id)));
        }
        info!("Deleted goal {} for user {}", goal_id, user.id);
        Ok(())
    }

    /// Add `amount` to the saved total
    pub async fn contribute(&self, user: &DomainUser, goal_id: &str, amount: f64) -> Result<DomainGoal> {
        let amount = validate_amount("Contribution", amount)?;
        let mut goal = self.get_goal(user, goal_id).await?;
        if goal.completed {
            return Err(DomainError::conflict(format!("Goal {} is already completed", goal_id)));
        }

        goal.current_amount = round2(goal.current_amount + amount);
        goal.completed = goal.is_reached();
        goal.updated_at = Utc::now();
        self.goal_repository.update_goal(&goal).await?;

        info!("Goal {} now at {:.2} of {:.2}", goal.id, goal.current_amount, goal.target_amount);
        if goal.completed {
            self.announce_completion(&goal).await;
        }
        Ok(goal)
    }

    async fn announce_completion(&self, goal: &DomainGoal) {
        let notification = NewNotification {
            kind: NotificationKind::GoalReached,
            title: format!("Meta atingida: {}", goal.title),
            message: format!(
                "Parabéns! Você juntou R$ {:.2} e concluiu a meta \"{}\".",
                goal.current_amount, goal.title
            ),
            reference: Some(goal.id.clone()),
        };
        if let Err(e) = self.notification_service.notify(&goal.user_id, notification).await {
            warn!("Failed to notify completion of goal {}: {}", goal.id, e);
        }
    }
}
