//! Analytics service: loads the records an analysis needs, applies plan
//! gating and hands the slices to the pure functions in `analytics`.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use shared::{CategoryAnalysis, Feature, TemporalAnalysis};
use std::sync::Arc;
use tracing::debug;

use crate::domain::analytics::{
    budget_status, category_breakdown, daily_average, largest_expense, month_over_month_change,
    monthly_series, projected_month_expenses, round2, savings_rate, total_expenses, total_income,
    trend, weekday_distribution,
};
use crate::domain::commands::analytics::{AdvancedResult, DashboardResult};
use crate::domain::errors::DomainError;
use crate::domain::models::{DomainUser, RecordFilter, YearMonth};
use crate::domain::plan::require_feature;
use crate::storage::traits::{BudgetStorage, Connection, ExpenseStorage, IncomeStorage};

pub const DASHBOARD_TOP_CATEGORIES: usize = 5;
pub const DASHBOARD_RECENT_EXPENSES: usize = 5;
pub const DEFAULT_TEMPORAL_MONTHS: u32 = 6;
pub const MAX_TEMPORAL_MONTHS: u32 = 24;
/// Months averaged by the advanced analysis
const ADVANCED_WINDOW: usize = 3;

#[derive(Clone)]
pub struct AnalyticsService {
    expense_repository: Arc<dyn ExpenseStorage>,
    income_repository: Arc<dyn IncomeStorage>,
    budget_repository: Arc<dyn BudgetStorage>,
}

impl AnalyticsService {
    pub fn new(connection: &dyn Connection) -> Self {
        Self {
            expense_repository: connection.expense_repository(),
            income_repository: connection.income_repository(),
            budget_repository: connection.budget_repository(),
        }
    }

    /// Monthly overview, available on every plan. Income figures are left
    /// out when the plan does not include income tracking.
    pub async fn dashboard(&self, user: &DomainUser, month: YearMonth, now: DateTime<Utc>) -> Result<DashboardResult> {
        let filter = RecordFilter::between(month.first_day(), month.last_day());
        let expenses = self.expense_repository.list_expenses(&user.id, &filter).await?;
        let budgets = self.budget_repository.list_budgets(&user.id, &month.to_string()).await?;
        let spent = total_expenses(&expenses);

        let (total_income, balance, rate) = if user.can_use(Feature::IncomeTracking, now) {
            let incomes = self.income_repository.list_incomes(&user.id, &filter).await?;
            let earned = total_income(&incomes);
            (Some(earned), Some(round2(earned - spent)), savings_rate(earned, spent))
        } else {
            (None, None, None)
        };

        let mut top_categories = category_breakdown(&expenses);
        top_categories.truncate(DASHBOARD_TOP_CATEGORIES);

        debug!("Dashboard for {} in {}: {} expenses", user.id, month, expenses.len());
        Ok(DashboardResult {
            month: month.to_string(),
            total_expenses: spent,
            total_income,
            balance,
            savings_rate: rate,
            expense_count: expenses.len(),
            top_categories,
            budgets: budget_status(&budgets, &expenses),
            // Storage returns newest first
            recent_expenses: expenses.into_iter().take(DASHBOARD_RECENT_EXPENSES).collect(),
        })
    }

    pub async fn categories(
        &self,
        user: &DomainUser,
        start: NaiveDate,
        end: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<CategoryAnalysis> {
        require_feature(user, Feature::AdvancedAnalytics, now)?;
        if start > end {
            return Err(DomainError::validation("start_date must not be after end_date"));
        }

        let expenses = self
            .expense_repository
            .list_expenses(&user.id, &RecordFilter::between(start, end))
            .await?;
        Ok(CategoryAnalysis {
            start_date: start,
            end_date: end,
            total: total_expenses(&expenses),
            categories: category_breakdown(&expenses),
        })
    }

    /// Series over the `months` months ending at `end_month`
    pub async fn temporal(
        &self,
        user: &DomainUser,
        months: u32,
        end_month: YearMonth,
        now: DateTime<Utc>,
    ) -> Result<TemporalAnalysis> {
        require_feature(user, Feature::AdvancedAnalytics, now)?;
        if !(1..=MAX_TEMPORAL_MONTHS).contains(&months) {
            return Err(DomainError::validation(format!(
                "months must be between 1 and {}",
                MAX_TEMPORAL_MONTHS
            )));
        }

        let periods = end_month.trailing(months as usize);
        let start = periods.first().map(|m| m.first_day()).unwrap_or_else(|| end_month.first_day());
        let end = end_month.last_day();
        let filter = RecordFilter::between(start, end);
        let expenses = self.expense_repository.list_expenses(&user.id, &filter).await?;
        let incomes = self.income_repository.list_incomes(&user.id, &filter).await?;

        // Days that have not happened yet do not dilute the average
        let today = now.date_naive();
        let average_end = if today >= start && today < end { today } else { end };

        Ok(TemporalAnalysis {
            months: monthly_series(&expenses, &incomes, &periods),
            weekdays: weekday_distribution(&expenses),
            daily_average: daily_average(total_expenses(&expenses), start, average_end),
        })
    }

    pub async fn advanced(&self, user: &DomainUser, end_month: YearMonth, now: DateTime<Utc>) -> Result<AdvancedResult> {
        require_feature(user, Feature::AdvancedAnalytics, now)?;

        let window = end_month.trailing(ADVANCED_WINDOW);
        let start = window.first().map(|m| m.first_day()).unwrap_or_else(|| end_month.first_day());
        let filter = RecordFilter::between(start, end_month.last_day());
        let expenses = self.expense_repository.list_expenses(&user.id, &filter).await?;
        let incomes = self.income_repository.list_incomes(&user.id, &filter).await?;

        let series = monthly_series(&expenses, &incomes, &window);
        let monthly_expenses: Vec<f64> = series.iter().map(|m| m.total_expenses).collect();
        let months = series.len().max(1) as f64;
        let average_monthly_expenses = round2(monthly_expenses.iter().sum::<f64>() / months);
        let average_monthly_income = round2(series.iter().map(|m| m.total_income).sum::<f64>() / months);

        let (current, previous) = match series.as_slice() {
            [.., previous, current] => (current.clone(), Some(previous.clone())),
            [current] => (current.clone(), None),
            [] => return Err(DomainError::validation("empty analysis window")),
        };

        let month_expenses: Vec<_> = expenses
            .into_iter()
            .filter(|e| end_month.contains(e.date))
            .collect();

        Ok(AdvancedResult {
            month: end_month.to_string(),
            month_over_month_change: previous
                .and_then(|p| month_over_month_change(current.total_expenses, p.total_expenses)),
            average_monthly_expenses,
            average_monthly_income,
            projected_month_expenses: projected_month_expenses(current.total_expenses, end_month, now.date_naive()),
            largest_expense: largest_expense(&month_expenses).cloned(),
            trend: trend(&monthly_expenses),
            savings_rate: savings_rate(current.total_income, current.total_expenses),
        })
    }
}
