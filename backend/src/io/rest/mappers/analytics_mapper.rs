use shared::{AdvancedAnalytics, DashboardSummary};

use super::ledger_mapper::ExpenseMapper;
use crate::domain::commands::analytics::{AdvancedResult, DashboardResult};

pub struct AnalyticsMapper;

impl AnalyticsMapper {
    pub fn to_dashboard_dto(result: DashboardResult) -> DashboardSummary {
        DashboardSummary {
            month: result.month,
            total_expenses: result.total_expenses,
            total_income: result.total_income,
            balance: result.balance,
            savings_rate: result.savings_rate,
            expense_count: result.expense_count,
            top_categories: result.top_categories,
            budgets: result.budgets,
            recent_expenses: ExpenseMapper::to_dto_list(result.recent_expenses),
        }
    }

    pub fn to_advanced_dto(result: AdvancedResult) -> AdvancedAnalytics {
        AdvancedAnalytics {
            month: result.month,
            month_over_month_change: result.month_over_month_change,
            average_monthly_expenses: result.average_monthly_expenses,
            average_monthly_income: result.average_monthly_income,
            projected_month_expenses: result.projected_month_expenses,
            largest_expense: result.largest_expense.map(ExpenseMapper::to_dto),
            trend: result.trend,
            savings_rate: result.savings_rate,
        }
    }
}
