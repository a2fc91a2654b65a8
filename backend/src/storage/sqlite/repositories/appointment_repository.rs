use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::appointment::sort_appointments;
use crate::domain::models::DomainAppointment;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::AppointmentStorage;

/// Repository for appointment operations
#[derive(Clone)]
pub struct AppointmentRepository {
    db: DbConnection,
}

impl AppointmentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> DomainAppointment {
        DomainAppointment {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            description: row.get("description"),
            date: row.get("date"),
            time: row.get("time"),
            location: row.get("location"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl AppointmentStorage for AppointmentRepository {
    async fn store_appointment(&self, appointment: &DomainAppointment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO appointments (id, user_id, title, description, date, time, location, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&appointment.id)
        .bind(&appointment.user_id)
        .bind(&appointment.title)
        .bind(&appointment.description)
        .bind(appointment.date)
        .bind(appointment.time)
        .bind(&appointment.location)
        .bind(appointment.created_at)
        .bind(appointment.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_appointment(&self, user_id: &str, appointment_id: &str) -> Result<Option<DomainAppointment>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, description, date, time, location, created_at, updated_at
            FROM appointments
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(user_id)
        .bind(appointment_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn list_appointments(&self, user_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DomainAppointment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, description, date, time, location, created_at, updated_at
            FROM appointments
            WHERE user_id = ? AND date >= ? AND date <= ?
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.db.pool())
        .await?;

        let mut appointments: Vec<DomainAppointment> = rows.iter().map(Self::map_row).collect();
        sort_appointments(&mut appointments);
        Ok(appointments)
    }

    async fn update_appointment(&self, appointment: &DomainAppointment) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE appointments
            SET title = ?, description = ?, date = ?, time = ?, location = ?, updated_at = ?
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(&appointment.title)
        .bind(&appointment.description)
        .bind(appointment.date)
        .bind(appointment.time)
        .bind(&appointment.location)
        .bind(appointment.updated_at)
        .bind(&appointment.user_id)
        .bind(&appointment.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_appointment(&self, user_id: &str, appointment_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(appointment_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::test_utils::db_with_user;
    use chrono::{NaiveTime, Utc};

    fn appointment(id: &str, date: &str, time: Option<&str>) -> DomainAppointment {
        let now = Utc::now();
        DomainAppointment {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: format!("Compromisso {}", id),
            description: None,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: time.map(|t| NaiveTime::parse_from_str(t, "%H:%M").unwrap()),
            location: Some("Clínica".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_list_in_calendar_order() {
        let repo = AppointmentRepository::new(db_with_user("u1").await);
        repo.store_appointment(&appointment("late", "2025-06-10", Some("15:00"))).await.unwrap();
        repo.store_appointment(&appointment("early", "2025-06-10", Some("08:30"))).await.unwrap();
        repo.store_appointment(&appointment("untimed", "2025-06-10", None)).await.unwrap();
        repo.store_appointment(&appointment("next", "2025-06-11", Some("07:00"))).await.unwrap();
        repo.store_appointment(&appointment("outside", "2025-07-01", None)).await.unwrap();

        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let found = repo.list_appointments("u1", start, end).await.unwrap();
        let ids: Vec<&str> = found.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["untimed", "early", "late", "next"]);
    }

    #[tokio::test]
    async fn test_update_clears_time() {
        let repo = AppointmentRepository::new(db_with_user("u1").await);
        let mut a = appointment("a1", "2025-06-10", Some("15:00"));
        repo.store_appointment(&a).await.unwrap();

        a.time = None;
        a.title = "Dentista".to_string();
        repo.update_appointment(&a).await.unwrap();

        let loaded = repo.get_appointment("u1", "a1").await.unwrap().unwrap();
        assert_eq!(loaded.title, "Dentista");
        assert!(loaded.time.is_none());
        assert!(repo.delete_appointment("u1", "a1").await.unwrap());
    }
}
