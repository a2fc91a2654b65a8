//! In-memory storage backend.
//!
//! Everything lives in one `MemoryStore` behind a lock, so a single store
//! implements every repository trait with the same ordering and dedup rules
//! as the SQLite backend. Used for demos and for API tests.

pub mod demo;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::models::appointment::sort_appointments;
use crate::domain::models::{
    ChatSession, DomainAppointment, DomainBudget, DomainExpense, DomainGoal, DomainIncome,
    DomainNotification, DomainUser, RecordFilter,
};
use crate::storage::traits::{
    AppointmentStorage, BudgetStorage, ChatSessionStorage, Connection, ExpenseStorage,
    GoalStorage, IncomeStorage, NotificationStorage, UserStorage,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, DomainUser>,
    expenses: Vec<DomainExpense>,
    incomes: Vec<DomainIncome>,
    appointments: Vec<DomainAppointment>,
    budgets: Vec<DomainBudget>,
    goals: Vec<DomainGoal>,
    notifications: Vec<DomainNotification>,
    sessions: HashMap<String, ChatSession>,
}

/// Lock-protected collections shared by every repository handle
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state.read().map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state.write().map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

/// MemoryConnection hands out repository handles over one shared `MemoryStore`
#[derive(Clone, Default)]
pub struct MemoryConnection {
    store: Arc<MemoryStore>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the demo account
    pub async fn with_demo_data() -> Result<Self> {
        let connection = Self::new();
        demo::seed(&connection, chrono::Utc::now()).await?;
        Ok(connection)
    }
}

impl Connection for MemoryConnection {
    fn user_repository(&self) -> Arc<dyn UserStorage> {
        self.store.clone()
    }

    fn expense_repository(&self) -> Arc<dyn ExpenseStorage> {
        self.store.clone()
    }

    fn income_repository(&self) -> Arc<dyn IncomeStorage> {
        self.store.clone()
    }

    fn appointment_repository(&self) -> Arc<dyn AppointmentStorage> {
        self.store.clone()
    }

    fn budget_repository(&self) -> Arc<dyn BudgetStorage> {
        self.store.clone()
    }

    fn goal_repository(&self) -> Arc<dyn GoalStorage> {
        self.store.clone()
    }

    fn notification_repository(&self) -> Arc<dyn NotificationStorage> {
        self.store.clone()
    }

    fn chat_session_repository(&self) -> Arc<dyn ChatSessionStorage> {
        self.store.clone()
    }
}

/// date desc, created_at desc, id desc
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (NaiveDate, chrono::DateTime<chrono::Utc>, &str)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl UserStorage for MemoryStore {
    async fn store_user(&self, user: &DomainUser) -> Result<()> {
        let mut state = self.write()?;
        let email = user.email.to_lowercase();
        if state.users.contains_key(&user.id) || state.users.values().any(|u| u.email == email) {
            return Err(anyhow!("user {} or email {} already stored", user.id, email));
        }
        let mut user = user.clone();
        user.email = email;
        state.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<DomainUser>> {
        Ok(self.read()?.users.get(user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<DomainUser>> {
        let email = email.trim().to_lowercase();
        Ok(self.read()?.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, user: &DomainUser) -> Result<()> {
        let mut state = self.write()?;
        let email = user.email.to_lowercase();
        if state.users.values().any(|u| u.email == email && u.id != user.id) {
            return Err(anyhow!("email {} already stored", email));
        }
        if let Some(existing) = state.users.get_mut(&user.id) {
            *existing = DomainUser { email, ..user.clone() };
        }
        Ok(())
    }
}

#[async_trait]
impl ExpenseStorage for MemoryStore {
    async fn store_expense(&self, expense: &DomainExpense) -> Result<()> {
        self.write()?.expenses.push(expense.clone());
        Ok(())
    }

    async fn get_expense(&self, user_id: &str, expense_id: &str) -> Result<Option<DomainExpense>> {
        Ok(self
            .read()?
            .expenses
            .iter()
            .find(|e| e.user_id == user_id && e.id == expense_id)
            .cloned())
    }

    async fn list_expenses(&self, user_id: &str, filter: &RecordFilter) -> Result<Vec<DomainExpense>> {
        let mut found: Vec<DomainExpense> = self
            .read()?
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id && filter.matches(e.date, &e.category))
            .cloned()
            .collect();
        newest_first(&mut found, |e| (e.date, e.created_at, e.id.as_str()));
        Ok(found)
    }

    async fn update_expense(&self, expense: &DomainExpense) -> Result<()> {
        let mut state = self.write()?;
        if let Some(existing) = state
            .expenses
            .iter_mut()
            .find(|e| e.user_id == expense.user_id && e.id == expense.id)
        {
            *existing = expense.clone();
        }
        Ok(())
    }

    async fn delete_expense(&self, user_id: &str, expense_id: &str) -> Result<bool> {
        let mut state = self.write()?;
        let before = state.expenses.len();
        state.expenses.retain(|e| !(e.user_id == user_id && e.id == expense_id));
        Ok(state.expenses.len() < before)
    }
}

#[async_trait]
impl IncomeStorage for MemoryStore {
    async fn store_income(&self, income: &DomainIncome) -> Result<()> {
        self.write()?.incomes.push(income.clone());
        Ok(())
    }

    async fn get_income(&self, user_id: &str, income_id: &str) -> Result<Option<DomainIncome>> {
        Ok(self
            .read()?
            .incomes
            .iter()
            .find(|i| i.user_id == user_id && i.id == income_id)
            .cloned())
    }

    async fn list_incomes(&self, user_id: &str, filter: &RecordFilter) -> Result<Vec<DomainIncome>> {
        let mut found: Vec<DomainIncome> = self
            .read()?
            .incomes
            .iter()
            .filter(|i| i.user_id == user_id && filter.matches(i.date, &i.source))
            .cloned()
            .collect();
        newest_first(&mut found, |i| (i.date, i.created_at, i.id.as_str()));
        Ok(found)
    }

    async fn update_income(&self, income: &DomainIncome) -> Result<()> {
        let mut state = self.write()?;
        if let Some(existing) = state
            .incomes
            .iter_mut()
            .find(|i| i.user_id == income.user_id && i.id == income.id)
        {
            *existing = income.clone();
        }
        Ok(())
    }

    async fn delete_income(&self, user_id: &str, income_id: &str) -> Result<bool> {
        let mut state = self.write()?;
        let before = state.incomes.len();
        state.incomes.retain(|i| !(i.user_id == user_id && i.id == income_id));
        Ok(state.incomes.len() < before)
    }
}

#[async_trait]
impl AppointmentStorage for MemoryStore {
    async fn store_appointment(&self, appointment: &DomainAppointment) -> Result<()> {
        self.write()?.appointments.push(appointment.clone());
        Ok(())
    }

    async fn get_appointment(&self, user_id: &str, appointment_id: &str) -> Result<Option<DomainAppointment>> {
        Ok(self
            .read()?
            .appointments
            .iter()
            .find(|a| a.user_id == user_id && a.id == appointment_id)
            .cloned())
    }

    async fn list_appointments(&self, user_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DomainAppointment>> {
        let mut found: Vec<DomainAppointment> = self
            .read()?
            .appointments
            .iter()
            .filter(|a| a.user_id == user_id && a.date >= start && a.date <= end)
            .cloned()
            .collect();
        sort_appointments(&mut found);
        Ok(found)
    }

    async fn update_appointment(&self, appointment: &DomainAppointment) -> Result<()> {
        let mut state = self.write()?;
        if let Some(existing) = state
            .appointments
            .iter_mut()
            .find(|a| a.user_id == appointment.user_id && a.id == appointment.id)
        {
            *existing = appointment.clone();
        }
        Ok(())
    }

    async fn delete_appointment(&self, user_id: &str, appointment_id: &str) -> Result<bool> {
        let mut state = self.write()?;
        let before = state.appointments.len();
        state.appointments.retain(|a| !(a.user_id == user_id && a.id == appointment_id));
        Ok(state.appointments.len() < before)
    }
}

#[async_trait]
impl BudgetStorage for MemoryStore {
    async fn upsert_budget(&self, budget: &DomainBudget) -> Result<()> {
        let mut state = self.write()?;
        match state.budgets.iter_mut().find(|b| {
            b.user_id == budget.user_id && b.category == budget.category && b.month == budget.month
        }) {
            Some(existing) => {
                existing.amount = budget.amount;
                existing.updated_at = budget.updated_at;
            }
            None => state.budgets.push(budget.clone()),
        }
        Ok(())
    }

    async fn get_budget(&self, user_id: &str, budget_id: &str) -> Result<Option<DomainBudget>> {
        Ok(self
            .read()?
            .budgets
            .iter()
            .find(|b| b.user_id == user_id && b.id == budget_id)
            .cloned())
    }

    async fn find_budget(&self, user_id: &str, category: &str, month: &str) -> Result<Option<DomainBudget>> {
        let wanted = category.to_lowercase();
        Ok(self
            .read()?
            .budgets
            .iter()
            .find(|b| b.user_id == user_id && b.month == month && b.category.to_lowercase() == wanted)
            .cloned())
    }

    async fn list_budgets(&self, user_id: &str, month: &str) -> Result<Vec<DomainBudget>> {
        let mut found: Vec<DomainBudget> = self
            .read()?
            .budgets
            .iter()
            .filter(|b| b.user_id == user_id && b.month == month)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(found)
    }

    async fn delete_budget(&self, user_id: &str, budget_id: &str) -> Result<bool> {
        let mut state = self.write()?;
        let before = state.budgets.len();
        state.budgets.retain(|b| !(b.user_id == user_id && b.id == budget_id));
        Ok(state.budgets.len() < before)
    }
}

#[async_trait]
impl GoalStorage for MemoryStore {
    async fn store_goal(&self, goal: &DomainGoal) -> Result<()> {
        self.write()?.goals.push(goal.clone());
        Ok(())
    }

    async fn get_goal(&self, user_id: &str, goal_id: &str) -> Result<Option<DomainGoal>> {
        Ok(self
            .read()?
            .goals
            .iter()
            .find(|g| g.user_id == user_id && g.id == goal_id)
            .cloned())
    }

    async fn list_goals(&self, user_id: &str) -> Result<Vec<DomainGoal>> {
        let mut found: Vec<DomainGoal> = self
            .read()?
            .goals
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(found)
    }

    async fn update_goal(&self, goal: &DomainGoal) -> Result<()> {
        let mut state = self.write()?;
        if let Some(existing) = state
            .goals
            .iter_mut()
            .find(|g| g.user_id == goal.user_id && g.id == goal.id)
        {
            *existing = goal.clone();
        }
        Ok(())
    }

    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<bool> {
        let mut state = self.write()?;
        let before = state.goals.len();
        state.goals.retain(|g| !(g.user_id == user_id && g.id == goal_id));
        Ok(state.goals.len() < before)
    }
}

#[async_trait]
impl NotificationStorage for MemoryStore {
    async fn store_notification(&self, notification: &DomainNotification) -> Result<bool> {
        let mut state = self.write()?;
        let duplicate = notification.reference.is_some()
            && state.notifications.iter().any(|n| {
                n.user_id == notification.user_id
                    && n.kind == notification.kind
                    && n.reference == notification.reference
            });
        if duplicate {
            return Ok(false);
        }
        state.notifications.push(notification.clone());
        Ok(true)
    }

    async fn list_notifications(&self, user_id: &str, unread_only: bool, limit: u32) -> Result<Vec<DomainNotification>> {
        let mut found: Vec<DomainNotification> = self
            .read()?
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.read))
            .cloned()
            .collect();
        found.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn count_unread(&self, user_id: &str) -> Result<u64> {
        Ok(self
            .read()?
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as u64)
    }

    async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<bool> {
        let mut state = self.write()?;
        match state
            .notifications
            .iter_mut()
            .find(|n| n.user_id == user_id && n.id == notification_id)
        {
            Some(n) => {
                n.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let mut state = self.write()?;
        let mut updated = 0;
        for n in state.notifications.iter_mut().filter(|n| n.user_id == user_id && !n.read) {
            n.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_notification(&self, user_id: &str, notification_id: &str) -> Result<bool> {
        let mut state = self.write()?;
        let before = state.notifications.len();
        state.notifications.retain(|n| !(n.user_id == user_id && n.id == notification_id));
        Ok(state.notifications.len() < before)
    }
}

#[async_trait]
impl ChatSessionStorage for MemoryStore {
    async fn get_session(&self, user_id: &str) -> Result<Option<ChatSession>> {
        Ok(self.read()?.sessions.get(user_id).cloned())
    }

    async fn save_session(&self, session: &ChatSession) -> Result<()> {
        self.write()?.sessions.insert(session.user_id.clone(), session.clone());
        Ok(())
    }

    async fn delete_session(&self, user_id: &str) -> Result<()> {
        self.write()?.sessions.remove(user_id);
        Ok(())
    }
}
