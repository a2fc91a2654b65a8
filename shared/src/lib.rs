use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription level of a user.
///
/// `ouro` is the paid tier; `gold` is accepted as an alias when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Bronze,
    #[serde(alias = "gold")]
    Ouro,
    Trial,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Bronze => "bronze",
            PlanTier::Ouro => "ouro",
            PlanTier::Trial => "trial",
        }
    }

    /// Whether this tier unlocks the given feature
    pub fn allows(&self, feature: Feature) -> bool {
        match self {
            PlanTier::Ouro | PlanTier::Trial => true,
            PlanTier::Bronze => match feature {
                Feature::IncomeTracking | Feature::Calendar | Feature::AdvancedAnalytics => false,
            },
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bronze" => Ok(PlanTier::Bronze),
            "ouro" | "gold" => Ok(PlanTier::Ouro),
            "trial" => Ok(PlanTier::Trial),
            other => Err(format!("Unknown plan tier: {}", other)),
        }
    }
}

/// Features gated by plan tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    IncomeTracking,
    Calendar,
    AdvancedAnalytics,
}

impl Feature {
    pub const ALL: [Feature; 3] = [
        Feature::IncomeTracking,
        Feature::Calendar,
        Feature::AdvancedAnalytics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::IncomeTracking => "income_tracking",
            Feature::Calendar => "calendar",
            Feature::AdvancedAnalytics => "advanced_analytics",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub plan_tier: PlanTier,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePlanRequest {
    pub plan_tier: PlanTier,
}

/// Feature availability for the calling user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAccess {
    pub plan_tier: PlanTier,
    /// Tier after trial expiry is taken into account
    pub effective_tier: PlanTier,
    pub trial_days_remaining: Option<i64>,
    pub income_tracking: bool,
    pub calendar: bool,
    pub advanced_analytics: bool,
}

// ---------------------------------------------------------------------------
// Expenses and incomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    pub amount: f64,
    pub category: String,
    pub description: String,
    /// Defaults to today when omitted
    pub date: Option<NaiveDate>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpenseRequest {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<Expense>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub source: String,
    pub description: String,
    pub date: NaiveDate,
    pub recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIncomeRequest {
    pub amount: f64,
    pub source: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub recurring: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateIncomeRequest {
    pub amount: Option<f64>,
    pub source: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub recurring: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeListResponse {
    pub incomes: Vec<Income>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub location: Option<String>,
}

/// Type of calendar day for explicit rendering logic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalendarDayType {
    /// Empty padding day before the start of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
}

/// A calendar month with the appointments of each day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarMonth {
    pub month: u32,
    pub year: i32,
    pub month_name: String,
    /// 0 = Sunday, 1 = Monday, etc.
    pub first_day_of_week: u32,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    pub day: u32,
    pub day_type: CalendarDayType,
    pub appointments: Vec<Appointment>,
}

// ---------------------------------------------------------------------------
// Budgets and goals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub amount: f64,
    /// Month in `YYYY-MM` form
    pub month: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertBudgetRequest {
    pub category: String,
    pub amount: f64,
    pub month: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetHealth {
    Ok,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub budget_id: String,
    pub category: String,
    pub budgeted: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage_used: f64,
    pub status: BudgetHealth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Option<NaiveDate>,
    pub completed: bool,
    /// Percentage of the target reached, capped at 100
    pub progress: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub target_amount: Option<f64>,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributeGoalRequest {
    pub amount: f64,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BudgetWarning,
    BudgetExceeded,
    AppointmentReminder,
    GoalReached,
    TrialExpiring,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::BudgetWarning => "budget_warning",
            NotificationKind::BudgetExceeded => "budget_exceeded",
            NotificationKind::AppointmentReminder => "appointment_reminder",
            NotificationKind::GoalReached => "goal_reached",
            NotificationKind::TrialExpiring => "trial_expiring",
            NotificationKind::System => "system",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "budget_warning" => Ok(NotificationKind::BudgetWarning),
            "budget_exceeded" => Ok(NotificationKind::BudgetExceeded),
            "appointment_reminder" => Ok(NotificationKind::AppointmentReminder),
            "goal_reached" => Ok(NotificationKind::GoalReached),
            "trial_expiring" => Ok(NotificationKind::TrialExpiring),
            "system" => Ok(NotificationKind::System),
            other => Err(format!("Unknown notification kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub reference: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: usize,
    pub average: f64,
    /// Share of the overall total, 0-100
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    /// Month in `YYYY-MM` form
    pub month: String,
    pub total_expenses: f64,
    pub total_income: f64,
    pub balance: f64,
    pub expense_count: usize,
    pub income_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub month: String,
    pub total_expenses: f64,
    /// Absent when the plan does not include income tracking
    pub total_income: Option<f64>,
    pub balance: Option<f64>,
    pub savings_rate: Option<f64>,
    pub expense_count: usize,
    pub top_categories: Vec<CategoryTotal>,
    pub budgets: Vec<BudgetStatus>,
    pub recent_expenses: Vec<Expense>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnalysis {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: f64,
    pub categories: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayTotal {
    /// 0 = Sunday ... 6 = Saturday
    pub weekday: u32,
    pub name: String,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalAnalysis {
    pub months: Vec<MonthlyTotals>,
    pub weekdays: Vec<WeekdayTotal>,
    pub daily_average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedAnalytics {
    pub month: String,
    /// Percentage change of expenses against the previous month
    pub month_over_month_change: Option<f64>,
    pub average_monthly_expenses: f64,
    pub average_monthly_income: f64,
    /// Linear projection of the month's expenses; only for the current month
    pub projected_month_expenses: Option<f64>,
    pub largest_expense: Option<Expense>,
    pub trend: Trend,
    pub savings_rate: Option<f64>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Which parsing rules apply to the next chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    #[default]
    Initial,
    WaitingExpense,
    WaitingIncome,
    WaitingAppointment,
}

impl ChatState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatState::Initial => "initial",
            ChatState::WaitingExpense => "waiting_expense",
            ChatState::WaitingIncome => "waiting_income",
            ChatState::WaitingAppointment => "waiting_appointment",
        }
    }
}

impl FromStr for ChatState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(ChatState::Initial),
            "waiting_expense" => Ok(ChatState::WaitingExpense),
            "waiting_income" => Ok(ChatState::WaitingIncome),
            "waiting_appointment" => Ok(ChatState::WaitingAppointment),
            other => Err(format!("Unknown chat state: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeDraft {
    pub amount: Option<f64>,
    pub source: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub location: Option<String>,
}

/// Record waiting for the user's confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingAction {
    Expense(ExpenseDraft),
    Income(IncomeDraft),
    Appointment(AppointmentDraft),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedRecord {
    /// `expense`, `income` or `appointment`
    pub kind: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub state: ChatState,
    pub reply: String,
    pub pending: Option<PendingAction>,
    pub created: Option<CreatedRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSessionResponse {
    pub state: ChatState,
    pub pending: Option<PendingAction>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

/// Log line forwarded by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    pub component: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
