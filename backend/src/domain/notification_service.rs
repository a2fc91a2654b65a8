//! Notification service domain logic for the finance tracker.
//!
//! Notifications are produced in two ways:
//!
//! - **On write**: budget thresholds after an expense is saved, goal completion
//!   after a contribution
//! - **On read**: appointment reminders and trial expiry notices are generated
//!   lazily by `refresh` whenever the inbox is listed or counted
//!
//! Every notification with a reference is unique per (user, kind, reference),
//! so re-running a check never produces the same notice twice.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use shared::{BudgetHealth, Feature, NotificationKind, PlanTier};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::analytics::{budget_health, percentage_of};
use crate::domain::errors::DomainError;
use crate::domain::models::{
    DomainNotification, DomainUser, NewNotification, RecordFilter, YearMonth,
};
use crate::domain::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::storage::traits::{
    AppointmentStorage, BudgetStorage, Connection, ExpenseStorage, NotificationStorage,
};

/// Appointments starting within this many hours get a reminder
pub const REMINDER_WINDOW_HOURS: i64 = 24;
/// Trials ending within this many days get an expiry notice
pub const TRIAL_NOTICE_DAYS: i64 = 3;

#[derive(Clone)]
pub struct NotificationService {
    notification_repository: Arc<dyn NotificationStorage>,
    budget_repository: Arc<dyn BudgetStorage>,
    expense_repository: Arc<dyn ExpenseStorage>,
    appointment_repository: Arc<dyn AppointmentStorage>,
}

impl NotificationService {
    pub fn new(connection: &dyn Connection) -> Self {
        Self {
            notification_repository: connection.notification_repository(),
            budget_repository: connection.budget_repository(),
            expense_repository: connection.expense_repository(),
            appointment_repository: connection.appointment_repository(),
        }
    }

    /// Store a notification unless its dedup key already exists.
    pub async fn notify(&self, user_id: &str, notification: NewNotification) -> Result<Option<DomainNotification>> {
        let stored = DomainNotification {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            reference: notification.reference,
            read: false,
            created_at: Utc::now(),
        };

        if self.notification_repository.store_notification(&stored).await? {
            info!("Notified user {}: {} ({:?})", user_id, stored.kind.as_str(), stored.reference);
            Ok(Some(stored))
        } else {
            debug!("Skipped duplicate {} for user {}", stored.kind.as_str(), user_id);
            Ok(None)
        }
    }

    /// Compare the month's spending in `category` with its budget and emit a
    /// warning at 80% or an exceeded notice above 100%.
    pub async fn check_budget(&self, user_id: &str, category: &str, month: YearMonth) -> Result<Option<DomainNotification>> {
        let Some(budget) = self
            .budget_repository
            .find_budget(user_id, category, &month.to_string())
            .await?
        else {
            return Ok(None);
        };

        let filter = RecordFilter {
            category: Some(budget.category.clone()),
            ..RecordFilter::between(month.first_day(), month.last_day())
        };
        let spent: f64 = self
            .expense_repository
            .list_expenses(user_id, &filter)
            .await?
            .iter()
            .map(|e| e.amount)
            .sum();
        let used = percentage_of(spent, budget.amount);
        let reference = Some(format!("{}:{}", budget.category.to_lowercase(), month));

        let notification = match budget_health(spent, budget.amount) {
            BudgetHealth::Ok => return Ok(None),
            BudgetHealth::Warning => NewNotification {
                kind: NotificationKind::BudgetWarning,
                title: format!("Orçamento de {} quase no limite", budget.category),
                message: format!(
                    "Você já usou {:.0}% do orçamento de {} em {} (R$ {:.2} de R$ {:.2}).",
                    used, budget.category, month, spent, budget.amount
                ),
                reference,
            },
            BudgetHealth::Exceeded => NewNotification {
                kind: NotificationKind::BudgetExceeded,
                title: format!("Orçamento de {} estourado", budget.category),
                message: format!(
                    "Os gastos com {} em {} passaram do orçamento: R$ {:.2} de R$ {:.2}.",
                    budget.category, month, spent, budget.amount
                ),
                reference,
            },
        };

        self.notify(user_id, notification).await
    }

    /// Generate the time-based notifications due at `now`.
    pub async fn refresh(&self, user: &DomainUser, now: DateTime<Utc>) -> Result<usize> {
        let mut created = 0;

        if user.can_use(Feature::Calendar, now) {
            let start = now.naive_utc();
            let end = start + Duration::hours(REMINDER_WINDOW_HOURS);
            let appointments = self
                .appointment_repository
                .list_appointments(&user.id, start.date(), end.date())
                .await?;

            for appointment in appointments {
                let starts_at = appointment.starts_at();
                if starts_at < start || starts_at > end {
                    continue;
                }
                let when = match appointment.time {
                    Some(time) => format!("{} às {}", appointment.date.format("%d/%m"), time.format("%H:%M")),
                    None => appointment.date.format("%d/%m").to_string(),
                };
                let notification = NewNotification {
                    kind: NotificationKind::AppointmentReminder,
                    title: format!("Lembrete: {}", appointment.title),
                    message: match &appointment.location {
                        Some(location) => format!("{} em {}, {}.", appointment.title, location, when),
                        None => format!("{} em {}.", appointment.title, when),
                    },
                    reference: Some(appointment.id.clone()),
                };
                if self.notify(&user.id, notification).await?.is_some() {
                    created += 1;
                }
            }
        }

        if let (PlanTier::Trial, Some(ends_at)) = (user.plan_tier, user.trial_ends_at) {
            if ends_at > now && ends_at <= now + Duration::days(TRIAL_NOTICE_DAYS) {
                let days = user.trial_days_remaining(now).unwrap_or(0);
                let notification = NewNotification {
                    kind: NotificationKind::TrialExpiring,
                    title: "Seu período de teste está acabando".to_string(),
                    message: format!(
                        "Faltam {} dia(s) para o fim do teste. Assine o plano Ouro para manter receitas, agenda e análises avançadas.",
                        days
                    ),
                    reference: Some(format!("trial:{}", ends_at.date_naive())),
                };
                if self.notify(&user.id, notification).await?.is_some() {
                    created += 1;
                }
            }
        }

        Ok(created)
    }

    /// Newest first, after generating any due notifications
    pub async fn list(&self, user: &DomainUser, unread_only: bool, limit: Option<u32>, now: DateTime<Utc>) -> Result<Vec<DomainNotification>> {
        self.refresh(user, now).await?;
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        self.notification_repository
            .list_notifications(&user.id, unread_only, limit)
            .await
    }

    pub async fn unread_count(&self, user: &DomainUser, now: DateTime<Utc>) -> Result<u64> {
        self.refresh(user, now).await?;
        self.notification_repository.count_unread(&user.id).await
    }

    pub async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<()> {
        if self.notification_repository.mark_read(user_id, notification_id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found(format!("Notification {}", notification_id)))
        }
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        self.notification_repository.mark_all_read(user_id).await
    }

    pub async fn delete(&self, user_id: &str, notification_id: &str) -> Result<()> {
        if self.notification_repository.delete_notification(user_id, notification_id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found(format!("Notification {}", notification_id)))
        }
    }
}
