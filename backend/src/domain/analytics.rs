//! Aggregations over expense and income records.
//!
//! Everything here is a pure function over slices that the services have
//! already loaded and filtered; no storage access and no clock reads.
//! Money totals and percentages are rounded to cents.

use chrono::{Datelike, NaiveDate};
use shared::{BudgetHealth, BudgetStatus, CategoryTotal, MonthlyTotals, Trend, WeekdayTotal};
use std::collections::HashMap;

use crate::domain::models::{DomainBudget, DomainExpense, DomainIncome, YearMonth};

/// Share of the budget at which a warning is raised
pub const WARNING_THRESHOLD: f64 = 80.0;
/// Relative change between months below which the trend is stable
pub const TREND_THRESHOLD: f64 = 5.0;

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part` as a percentage of `whole`; zero when `whole` is not positive
pub fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        0.0
    } else {
        round2(part / whole * 100.0)
    }
}

pub fn budget_health(spent: f64, budgeted: f64) -> BudgetHealth {
    let used = percentage_of(spent, budgeted);
    if used > 100.0 {
        BudgetHealth::Exceeded
    } else if used >= WARNING_THRESHOLD {
        BudgetHealth::Warning
    } else {
        BudgetHealth::Ok
    }
}

/// Status of each budget against the expenses of its month.
/// `expenses` must already be restricted to that month.
pub fn budget_status(budgets: &[DomainBudget], expenses: &[DomainExpense]) -> Vec<BudgetStatus> {
    let mut spent_by_category: HashMap<String, f64> = HashMap::new();
    for expense in expenses {
        *spent_by_category.entry(expense.category.to_lowercase()).or_insert(0.0) += expense.amount;
    }

    budgets
        .iter()
        .map(|budget| {
            let spent = round2(
                spent_by_category
                    .get(&budget.category.to_lowercase())
                    .copied()
                    .unwrap_or(0.0),
            );
            BudgetStatus {
                budget_id: budget.id.clone(),
                category: budget.category.clone(),
                budgeted: budget.amount,
                spent,
                remaining: round2(budget.amount - spent),
                percentage_used: percentage_of(spent, budget.amount),
                status: budget_health(spent, budget.amount),
            }
        })
        .collect()
}

/// Totals per category, largest first; ties are ordered by name
pub fn category_breakdown(expenses: &[DomainExpense]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    let mut grand_total = 0.0;
    for expense in expenses {
        let entry = totals.entry(expense.category.as_str()).or_insert((0.0, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
        grand_total += expense.amount;
    }

    let mut categories: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total: round2(total),
            count,
            average: round2(total / count as f64),
            percentage: percentage_of(total, grand_total),
        })
        .collect();

    categories.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    categories
}

/// One entry per month in `months` (in the given order), zero-filled
pub fn monthly_series(
    expenses: &[DomainExpense],
    incomes: &[DomainIncome],
    months: &[YearMonth],
) -> Vec<MonthlyTotals> {
    let mut expense_totals: HashMap<YearMonth, (f64, usize)> = HashMap::new();
    for expense in expenses {
        let entry = expense_totals.entry(YearMonth::of(expense.date)).or_insert((0.0, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }
    let mut income_totals: HashMap<YearMonth, (f64, usize)> = HashMap::new();
    for income in incomes {
        let entry = income_totals.entry(YearMonth::of(income.date)).or_insert((0.0, 0));
        entry.0 += income.amount;
        entry.1 += 1;
    }

    months
        .iter()
        .map(|month| {
            let (spent, expense_count) = expense_totals.get(month).copied().unwrap_or((0.0, 0));
            let (earned, income_count) = income_totals.get(month).copied().unwrap_or((0.0, 0));
            MonthlyTotals {
                month: month.to_string(),
                total_expenses: round2(spent),
                total_income: round2(earned),
                balance: round2(earned - spent),
                expense_count,
                income_count,
            }
        })
        .collect()
}

/// Spending per weekday, Sunday first
pub fn weekday_distribution(expenses: &[DomainExpense]) -> Vec<WeekdayTotal> {
    let mut buckets = [(0.0_f64, 0_usize); 7];
    for expense in expenses {
        let index = expense.date.weekday().num_days_from_sunday() as usize;
        buckets[index].0 += expense.amount;
        buckets[index].1 += 1;
    }

    buckets
        .iter()
        .enumerate()
        .map(|(index, (total, count))| WeekdayTotal {
            weekday: index as u32,
            name: WEEKDAY_NAMES[index].to_string(),
            total: round2(*total),
            count: *count,
        })
        .collect()
}

/// Average spending per calendar day of `start..=end`
pub fn daily_average(total: f64, start: NaiveDate, end: NaiveDate) -> f64 {
    let days = (end - start).num_days() + 1;
    if days <= 0 {
        0.0
    } else {
        round2(total / days as f64)
    }
}

/// Percentage change from `previous` to `current`; undefined when `previous` is zero
pub fn month_over_month_change(current: f64, previous: f64) -> Option<f64> {
    if previous <= 0.0 {
        None
    } else {
        Some(round2((current - previous) / previous * 100.0))
    }
}

/// Linear month-end projection of `spent`, only while `month` is in progress on `today`
pub fn projected_month_expenses(spent: f64, month: YearMonth, today: NaiveDate) -> Option<f64> {
    if !month.contains(today) {
        return None;
    }
    let elapsed = today.day() as f64;
    Some(round2(spent / elapsed * month.days_in_month() as f64))
}

/// Compare the first and last of the given monthly totals
pub fn trend(monthly_expenses: &[f64]) -> Trend {
    let (Some(first), Some(last)) = (monthly_expenses.first(), monthly_expenses.last()) else {
        return Trend::Stable;
    };
    if *first <= 0.0 {
        return if *last > 0.0 { Trend::Increasing } else { Trend::Stable };
    }
    let change = (last - first) / first * 100.0;
    if change > TREND_THRESHOLD {
        Trend::Increasing
    } else if change < -TREND_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Share of income left after expenses, as a percentage; undefined without income
pub fn savings_rate(income: f64, expenses: f64) -> Option<f64> {
    if income <= 0.0 {
        None
    } else {
        Some(round2((income - expenses) / income * 100.0))
    }
}

pub fn largest_expense(expenses: &[DomainExpense]) -> Option<&DomainExpense> {
    expenses.iter().max_by(|a, b| a.amount.total_cmp(&b.amount))
}

pub fn total_expenses(expenses: &[DomainExpense]) -> f64 {
    round2(expenses.iter().map(|e| e.amount).sum())
}

pub fn total_income(incomes: &[DomainIncome]) -> f64 {
    round2(incomes.iter().map(|i| i.amount).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn expense(amount: f64, category: &str, date: &str) -> DomainExpense {
        let now = Utc::now();
        DomainExpense {
            id: format!("{}-{}-{}", category, amount, date),
            user_id: "u1".to_string(),
            amount,
            category: category.to_string(),
            description: "x".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            payment_method: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn income(amount: f64, date: &str) -> DomainIncome {
        let now = Utc::now();
        DomainIncome {
            id: format!("i-{}", date),
            user_id: "u1".to_string(),
            amount,
            source: "Salário".to_string(),
            description: "x".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            recurring: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn budget(category: &str, amount: f64) -> DomainBudget {
        let now = Utc::now();
        DomainBudget {
            id: format!("b-{}", category),
            user_id: "u1".to_string(),
            category: category.to_string(),
            amount,
            month: "2025-06".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_budget_health_thresholds() {
        assert_eq!(budget_health(79.99, 100.0), BudgetHealth::Ok);
        assert_eq!(budget_health(80.0, 100.0), BudgetHealth::Warning);
        assert_eq!(budget_health(100.0, 100.0), BudgetHealth::Warning);
        assert_eq!(budget_health(100.01, 100.0), BudgetHealth::Exceeded);
    }

    #[test]
    fn test_budget_status_matches_categories_case_insensitively() {
        let expenses = vec![
            expense(30.0, "lazer", "2025-06-02"),
            expense(60.0, "Lazer", "2025-06-03"),
            expense(10.0, "Transporte", "2025-06-03"),
        ];
        let status = budget_status(&[budget("Lazer", 100.0), budget("Saúde", 50.0)], &expenses);

        assert_eq!(status[0].spent, 90.0);
        assert_eq!(status[0].remaining, 10.0);
        assert_eq!(status[0].percentage_used, 90.0);
        assert_eq!(status[0].status, BudgetHealth::Warning);
        assert_eq!(status[1].spent, 0.0);
        assert_eq!(status[1].status, BudgetHealth::Ok);
    }

    #[test]
    fn test_category_breakdown_sorted_with_ties_by_name() {
        let expenses = vec![
            expense(50.0, "Transporte", "2025-06-01"),
            expense(20.0, "Alimentação", "2025-06-01"),
            expense(30.0, "Alimentação", "2025-06-02"),
            expense(100.0, "Moradia", "2025-06-05"),
        ];
        let categories = category_breakdown(&expenses);
        let names: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Moradia", "Alimentação", "Transporte"]);

        let food = &categories[1];
        assert_eq!(food.total, 50.0);
        assert_eq!(food.count, 2);
        assert_eq!(food.average, 25.0);
        assert_eq!(food.percentage, 25.0);
    }

    #[test]
    fn test_monthly_series_is_zero_filled() {
        let months = YearMonth::new(2025, 6).unwrap().trailing(3);
        let series = monthly_series(
            &[expense(40.0, "Lazer", "2025-06-10"), expense(10.0, "Lazer", "2025-04-01")],
            &[income(100.0, "2025-06-05")],
            &months,
        );

        let labels: Vec<&str> = series.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels, vec!["2025-04", "2025-05", "2025-06"]);
        assert_eq!(series[1].total_expenses, 0.0);
        assert_eq!(series[1].expense_count, 0);
        assert_eq!(series[2].balance, 60.0);
        assert_eq!(series[2].income_count, 1);
    }

    #[test]
    fn test_weekday_distribution_starts_on_sunday() {
        // 2025-06-01 is a Sunday, 2025-06-07 a Saturday
        let days = weekday_distribution(&[
            expense(10.0, "Lazer", "2025-06-01"),
            expense(5.0, "Lazer", "2025-06-07"),
            expense(5.0, "Lazer", "2025-06-14"),
        ]);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].name, "Sunday");
        assert_eq!(days[0].total, 10.0);
        assert_eq!(days[6].count, 2);
        assert_eq!(days[3].total, 0.0);
    }

    #[test]
    fn test_daily_average_counts_both_ends() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert_eq!(daily_average(100.0, start, end), 10.0);
        assert_eq!(daily_average(100.0, end, start), 0.0);
    }

    #[test]
    fn test_month_over_month_and_savings_rate() {
        assert_eq!(month_over_month_change(150.0, 100.0), Some(50.0));
        assert_eq!(month_over_month_change(50.0, 0.0), None);
        assert_eq!(savings_rate(1000.0, 750.0), Some(25.0));
        assert_eq!(savings_rate(0.0, 10.0), None);
    }

    #[test]
    fn test_projection_only_for_current_month() {
        let june = YearMonth::new(2025, 6).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert_eq!(projected_month_expenses(100.0, june, today), Some(300.0));
        assert_eq!(projected_month_expenses(100.0, june.previous(), today), None);
    }

    #[test]
    fn test_trend() {
        assert_eq!(trend(&[100.0, 120.0, 110.0]), Trend::Increasing);
        assert_eq!(trend(&[100.0, 80.0, 94.0]), Trend::Decreasing);
        assert_eq!(trend(&[100.0, 300.0, 104.0]), Trend::Stable);
        assert_eq!(trend(&[0.0, 0.0, 10.0]), Trend::Increasing);
        assert_eq!(trend(&[]), Trend::Stable);
    }

    #[test]
    fn test_largest_expense() {
        let expenses = vec![expense(10.0, "A", "2025-06-01"), expense(99.0, "B", "2025-06-02")];
        assert_eq!(largest_expense(&expenses).map(|e| e.amount), Some(99.0));
        assert!(largest_expense(&[]).is_none());
    }
}
