//! Demo account used when the server runs on the memory backend

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use shared::PlanTier;
use uuid::Uuid;

use crate::domain::models::{
    DomainAppointment, DomainBudget, DomainExpense, DomainGoal, DomainIncome, DomainUser, YearMonth,
};
use crate::storage::traits::Connection;

pub const DEMO_USER_ID: &str = "demo-user";

pub async fn seed(connection: &dyn Connection, now: DateTime<Utc>) -> Result<()> {
    let today = now.date_naive();
    let month = YearMonth::of(today);

    connection
        .user_repository()
        .store_user(&DomainUser {
            id: DEMO_USER_ID.to_string(),
            name: "Usuário Demo".to_string(),
            email: "demo@example.com".to_string(),
            plan_tier: PlanTier::Ouro,
            trial_ends_at: None,
            created_at: now,
            updated_at: now,
        })
        .await?;

    let day = |d: u32| clamp_to_month(month, d, today);
    let expenses = [
        (45.90, "Alimentação", "Almoço no restaurante", day(2)),
        (120.00, "Transporte", "Combustível", day(3)),
        (1500.00, "Moradia", "Aluguel", day(5)),
        (89.90, "Lazer", "Cinema e jantar", day(8)),
        (230.40, "Alimentação", "Supermercado", day(10)),
    ];
    let expense_repo = connection.expense_repository();
    for (amount, category, description, date) in expenses {
        expense_repo
            .store_expense(&DomainExpense {
                id: Uuid::new_v4().to_string(),
                user_id: DEMO_USER_ID.to_string(),
                amount,
                category: category.to_string(),
                description: description.to_string(),
                date,
                payment_method: None,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    connection
        .income_repository()
        .store_income(&DomainIncome {
            id: Uuid::new_v4().to_string(),
            user_id: DEMO_USER_ID.to_string(),
            amount: 5000.00,
            source: "Salário".to_string(),
            description: "Salário mensal".to_string(),
            date: month.first_day(),
            recurring: true,
            created_at: now,
            updated_at: now,
        })
        .await?;

    connection
        .budget_repository()
        .upsert_budget(&DomainBudget {
            id: Uuid::new_v4().to_string(),
            user_id: DEMO_USER_ID.to_string(),
            category: "Alimentação".to_string(),
            amount: 800.00,
            month: month.to_string(),
            created_at: now,
            updated_at: now,
        })
        .await?;

    connection
        .goal_repository()
        .store_goal(&DomainGoal {
            id: Uuid::new_v4().to_string(),
            user_id: DEMO_USER_ID.to_string(),
            title: "Reserva de emergência".to_string(),
            target_amount: 10000.00,
            current_amount: 2500.00,
            deadline: NaiveDate::from_ymd_opt(today.year() + 1, 1, 1),
            completed: false,
            created_at: now,
            updated_at: now,
        })
        .await?;

    connection
        .appointment_repository()
        .store_appointment(&DomainAppointment {
            id: Uuid::new_v4().to_string(),
            user_id: DEMO_USER_ID.to_string(),
            title: "Consulta no dentista".to_string(),
            description: None,
            date: today + Duration::days(3),
            time: NaiveTime::from_hms_opt(14, 30, 0),
            location: Some("Clínica Sorriso".to_string()),
            created_at: now,
            updated_at: now,
        })
        .await?;

    Ok(())
}

/// Day `d` of the month, but never after today
fn clamp_to_month(month: YearMonth, d: u32, today: NaiveDate) -> NaiveDate {
    let wanted = month.first_day() + Duration::days(i64::from(d.saturating_sub(1)));
    wanted.min(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RecordFilter;
    use crate::storage::memory::MemoryConnection;

    #[tokio::test]
    async fn test_seed_creates_demo_account() {
        let conn = MemoryConnection::new();
        seed(&conn, Utc::now()).await.unwrap();

        let user = conn.user_repository().get_user(DEMO_USER_ID).await.unwrap().unwrap();
        assert_eq!(user.plan_tier, PlanTier::Ouro);

        let expenses = conn.expense_repository().list_expenses(DEMO_USER_ID, &RecordFilter::default()).await.unwrap();
        assert_eq!(expenses.len(), 5);
        assert!(expenses.iter().all(|e| e.date <= Utc::now().date_naive()));
    }
}
