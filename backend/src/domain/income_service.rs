//! Income service domain logic for the finance tracker.
//!
//! Income tracking is a paid feature: every operation checks the caller's
//! plan first.

use anyhow::Result;
use chrono::Utc;
use shared::Feature;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::commands::ledger::{CreateIncomeCommand, RecordListQuery, UpdateIncomeCommand};
use crate::domain::errors::{clean_required, validate_amount, DomainError, MAX_CATEGORY_LEN, MAX_TEXT_LEN};
use crate::domain::expense_service::record_filter;
use crate::domain::models::{DomainIncome, DomainUser, RecordFilter};
use crate::domain::pagination::{paginate, Page};
use crate::domain::plan::require_feature;
use crate::storage::traits::{Connection, IncomeStorage};

#[derive(Clone)]
pub struct IncomeService {
    income_repository: Arc<dyn IncomeStorage>,
}

impl IncomeService {
    pub fn new(connection: &dyn Connection) -> Self {
        Self {
            income_repository: connection.income_repository(),
        }
    }

    pub async fn create_income(&self, user: &DomainUser, command: CreateIncomeCommand) -> Result<DomainIncome> {
        let now = Utc::now();
        require_feature(user, Feature::IncomeTracking, now)?;

        let income = DomainIncome {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            amount: validate_amount("Amount", command.amount)?,
            source: clean_required("Source", &command.source, MAX_CATEGORY_LEN)?,
            description: clean_required("Description", &command.description, MAX_TEXT_LEN)?,
            date: command.date.unwrap_or_else(|| now.date_naive()),
            recurring: command.recurring,
            created_at: now,
            updated_at: now,
        };

        self.income_repository.store_income(&income).await?;
        info!("Created income {} ({:.2} {}) for user {}", income.id, income.amount, income.source, user.id);
        Ok(income)
    }

    pub async fn get_income(&self, user: &DomainUser, income_id: &str) -> Result<DomainIncome> {
        require_feature(user, Feature::IncomeTracking, Utc::now())?;
        self.income_repository
            .get_income(&user.id, income_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Income {}", income_id)))
    }

    pub async fn update_income(&self, user: &DomainUser, income_id: &str, command: UpdateIncomeCommand) -> Result<DomainIncome> {
        let mut income = self.get_income(user, income_id).await?;

        if let Some(amount) = command.amount {
            income.amount = validate_amount("Amount", amount)?;
        }
        if let Some(source) = command.source {
            income.source = clean_required("Source", &source, MAX_CATEGORY_LEN)?;
        }
        if let Some(description) = command.description {
            income.description = clean_required("Description", &description, MAX_TEXT_LEN)?;
        }
        if let Some(date) = command.date {
            income.date = date;
        }
        if let Some(recurring) = command.recurring {
            income.recurring = recurring;
        }
        income.updated_at = Utc::now();

        self.income_repository.update_income(&income).await?;
        Ok(income)
    }

    pub async fn delete_income(&self, user: &DomainUser, income_id: &str) -> Result<()> {
        require_feature(user, Feature::IncomeTracking, Utc::now())?;
        if !self.income_repository.delete_income(&user.id, income_id).await? {
            return Err(DomainError::not_found(format!("Income {}", income_id)));
        }
        info!("Deleted income {} for user {}", income_id, user.id);
        Ok(())
    }

    pub async fn list_incomes(&self, user: &DomainUser, query: RecordListQuery) -> Result<Page<DomainIncome>> {
        require_feature(user, Feature::IncomeTracking, Utc::now())?;
        let filter = record_filter(&query)?;
        let incomes = self.income_repository.list_incomes(&user.id, &filter).await?;
        paginate(incomes, query.after.as_deref(), query.limit, |i| i.id.as_str())
    }

    /// Incomes matching `filter` without the plan check, for aggregations
    /// that decide themselves whether income is shown
    pub async fn incomes_matching(&self, user: &DomainUser, filter: &RecordFilter) -> Result<Vec<DomainIncome>> {
        self.income_repository.list_incomes(&user.id, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryConnection;
    use shared::PlanTier;

    fn user(tier: PlanTier) -> DomainUser {
        let now = Utc::now();
        DomainUser {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            plan_tier: tier,
            trial_ends_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn command(source: &str) -> CreateIncomeCommand {
        CreateIncomeCommand {
            amount: 3000.0,
            source: source.to_string(),
            description: "Salário de junho".to_string(),
            date: None,
            recurring: true,
        }
    }

    #[tokio::test]
    async fn test_bronze_cannot_track_income() {
        let service = IncomeService::new(&MemoryConnection::new());
        let err = service.create_income(&user(PlanTier::Bronze), command("Salário")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::FeatureLocked { feature: Feature::IncomeTracking, .. })
        ));
        assert!(service.list_incomes(&user(PlanTier::Bronze), RecordListQuery::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_ouro_income_lifecycle() {
        let service = IncomeService::new(&MemoryConnection::new());
        let ouro = user(PlanTier::Ouro);

        let income = service.create_income(&ouro, command("Salário")).await.unwrap();
        service.create_income(&ouro, command("Freelance")).await.unwrap();

        let filtered = service
            .list_incomes(&ouro, RecordListQuery { category: Some("salário".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(filtered.items.len(), 1);

        let updated = service
            .update_income(&ouro, &income.id, UpdateIncomeCommand { recurring: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert!(!updated.recurring);

        service.delete_income(&ouro, &income.id).await.unwrap();
        assert!(service.get_income(&ouro, &income.id).await.is_err());
    }
}
