//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod users {
    /// Input for registering a new user.
    #[derive(Debug, Clone)]
    pub struct CreateUserCommand {
        pub name: String,
        pub email: String,
    }

    /// Input for editing a user's profile. `None` keeps the current value.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateUserCommand {
        pub name: Option<String>,
        pub email: Option<String>,
    }
}

pub mod ledger {
    use chrono::NaiveDate;

    /// Input for recording an expense.
    #[derive(Debug, Clone)]
    pub struct CreateExpenseCommand {
        pub amount: f64,
        pub category: String,
        pub description: String,
        pub date: Option<NaiveDate>,
        pub payment_method: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateExpenseCommand {
        pub amount: Option<f64>,
        pub category: Option<String>,
        pub description: Option<String>,
        pub date: Option<NaiveDate>,
        pub payment_method: Option<String>,
    }

    /// Input for recording an income.
    #[derive(Debug, Clone)]
    pub struct CreateIncomeCommand {
        pub amount: f64,
        pub source: String,
        pub description: String,
        pub date: Option<NaiveDate>,
        pub recurring: bool,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateIncomeCommand {
        pub amount: Option<f64>,
        pub source: Option<String>,
        pub description: Option<String>,
        pub date: Option<NaiveDate>,
        pub recurring: Option<bool>,
    }

    /// Query parameters for listing expenses or incomes.
    #[derive(Debug, Clone, Default)]
    pub struct RecordListQuery {
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        /// Expense category or income source
        pub category: Option<String>,
        pub after: Option<String>,
        pub limit: Option<u32>,
    }
}

pub mod calendar {
    use chrono::{NaiveDate, NaiveTime};

    #[derive(Debug, Clone)]
    pub struct CreateAppointmentCommand {
        pub title: String,
        pub description: Option<String>,
        pub date: NaiveDate,
        pub time: Option<NaiveTime>,
        pub location: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateAppointmentCommand {
        pub title: Option<String>,
        pub description: Option<String>,
        pub date: Option<NaiveDate>,
        pub time: Option<NaiveTime>,
        pub location: Option<String>,
    }
}

pub mod planning {
    use chrono::NaiveDate;

    /// Input for setting the budget of a category for a month.
    #[derive(Debug, Clone)]
    pub struct UpsertBudgetCommand {
        pub category: String,
        pub amount: f64,
        /// `YYYY-MM`
        pub month: String,
    }

    #[derive(Debug, Clone)]
    pub struct CreateGoalCommand {
        pub title: String,
        pub target_amount: f64,
        pub current_amount: f64,
        pub deadline: Option<NaiveDate>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateGoalCommand {
        pub title: Option<String>,
        pub target_amount: Option<f64>,
        pub deadline: Option<NaiveDate>,
    }
}

pub mod analytics {
    use crate::domain::models::DomainExpense;
    use shared::{BudgetStatus, CategoryTotal, Trend};

    /// Result of building the monthly dashboard.
    #[derive(Debug, Clone)]
    pub struct DashboardResult {
        pub month: String,
        pub total_expenses: f64,
        pub total_income: Option<f64>,
        pub balance: Option<f64>,
        pub savings_rate: Option<f64>,
        pub expense_count: usize,
        pub top_categories: Vec<CategoryTotal>,
        pub budgets: Vec<BudgetStatus>,
        pub recent_expenses: Vec<DomainExpense>,
    }

    /// Result of the advanced analytics computation.
    #[derive(Debug, Clone)]
    pub struct AdvancedResult {
        pub month: String,
        pub month_over_month_change: Option<f64>,
        pub average_monthly_expenses: f64,
        pub average_monthly_income: f64,
        pub projected_month_expenses: Option<f64>,
        pub largest_expense: Option<DomainExpense>,
        pub trend: Trend,
        pub savings_rate: Option<f64>,
    }
}
