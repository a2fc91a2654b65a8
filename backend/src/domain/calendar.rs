//! Calendar domain logic: appointments and the month grid.
//!
//! The month grid starts on Sunday. Days before the 1st are emitted as
//! `PaddingBefore` cells so a client can render the grid row by row.

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use shared::{CalendarDayType, Feature};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::commands::calendar::{CreateAppointmentCommand, UpdateAppointmentCommand};
use crate::domain::errors::{clean_optional, clean_required, DomainError, MAX_TEXT_LEN};
use crate::domain::models::period::month_name;
use crate::domain::models::{DomainAppointment, DomainUser, YearMonth};
use crate::domain::plan::require_feature;
use crate::storage::traits::{AppointmentStorage, Connection};

/// Longest look-ahead accepted by `upcoming`
pub const MAX_UPCOMING_HOURS: i64 = 24 * 31;

/// One cell of the month grid
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarCell {
    pub day: u32,
    pub day_type: CalendarDayType,
    pub appointments: Vec<DomainAppointment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthView {
    pub month: u32,
    pub year: i32,
    pub month_name: &'static str,
    /// 0 = Sunday, 1 = Monday, etc.
    pub first_day_of_week: u32,
    pub days: Vec<CalendarCell>,
}

#[derive(Clone)]
pub struct CalendarService {
    appointment_repository: Arc<dyn AppointmentStorage>,
}

impl CalendarService {
    pub fn new(connection: &dyn Connection) -> Self {
        Self {
            appointment_repository: connection.appointment_repository(),
        }
    }

    pub async fn create_appointment(&self, user: &DomainUser, command: CreateAppointmentCommand) -> Result<DomainAppointment> {
        let now = Utc::now();
        require_feature(user, Feature::Calendar, now)?;

        let appointment = DomainAppointment {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            title: clean_required("Title", &command.title, MAX_TEXT_LEN)?,
            description: clean_optional("Description", command.description, MAX_TEXT_LEN)?,
            date: command.date,
            time: command.time,
            location: clean_optional("Location", command.location, MAX_TEXT_LEN)?,
            created_at: now,
            updated_at: now,
        };

        self.appointment_repository.store_appointment(&appointment).await?;
        info!("Created appointment {} on {} for user {}", appointment.id, appointment.date, user.id);
        Ok(appointment)
    }

    pub async fn get_appointment(&self, user: &DomainUser, appointment_id: &str) -> Result<DomainAppointment> {
        require_feature(user, Feature::Calendar, Utc::now())?;
        self.appointment_repository
            .get_appointment(&user.id, appointment_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Appointment {}", appointment_id)))
    }

    pub async fn update_appointment(
        &self,
        user: &DomainUser,
        appointment_id: &str,
        command: UpdateAppointmentCommand,
    ) -> Result<DomainAppointment> {
        let mut appointment = self.get_appointment(user, appointment_id).await?;

        if let Some(title) = command.title {
            appointment.title = clean_required("Title", &title, MAX_TEXT_LEN)?;
        }
        if command.description.is_some() {
            appointment.description = clean_optional("Description", command.description, MAX_TEXT_LEN)?;
        }
        if let Some(date) = command.date {
            appointment.date = date;
        }
        if command.time.is_some() {
            appointment.time = command.time;
        }
        if command.location.is_some() {
            appointment.location = clean_optional("Location", command.location, MAX_TEXT_LEN)?;
        }
        appointment.updated_at = Utc::now();

        self.appointment_repository.update_appointment(&appointment).await?;
        Ok(appointment)
    }

    pub async fn delete_appointment(&self, user: &DomainUser, appointment_id: &str) -> Result<()> {
        require_feature(user, Feature::Calendar, Utc::now())?;
        if !self.appointment_repository.delete_appointment(&user.id, appointment_id).await? {
            return Err(DomainError::not_found(format!("Appointment {}", appointment_id)));
        }
        info!("Deleted appointment {} for user {}", appointment_id, user.id);
        Ok(())
    }

    /// Appointments with `start <= date <= end`, in calendar order
    pub async fn list_appointments(&self, user: &DomainUser, start: NaiveDate, end: NaiveDate) -> Result<Vec<DomainAppointment>> {
        require_feature(user, Feature::Calendar, Utc::now())?;
        if start > end {
            return Err(DomainError::validation("start must not be after end"));
        }
        self.appointment_repository.list_appointments(&user.id, start, end).await
    }

    pub async fn month_view(&self, user: &DomainUser, year: i32, month: u32) -> Result<MonthView> {
        require_feature(user, Feature::Calendar, Utc::now())?;
        let period = YearMonth::new(year, month)?;
        let appointments = self
            .appointment_repository
            .list_appointments(&user.id, period.first_day(), period.last_day())
            .await?;
        Ok(build_month_view(period, appointments))
    }

    /// Appointments starting in `[now, now + within_hours]`
    pub async fn upcoming(&self, user: &DomainUser, now: DateTime<Utc>, within_hours: i64) -> Result<Vec<DomainAppointment>> {
        require_feature(user, Feature::Calendar, now)?;
        if !(1..=MAX_UPCOMING_HOURS).contains(&within_hours) {
            return Err(DomainError::validation(format!(
                "hours must be between 1 and {}",
                MAX_UPCOMING_HOURS
            )));
        }

        let start = now.naive_utc();
        let end = start + Duration::hours(within_hours);
        let appointments = self
            .appointment_repository
            .list_appointments(&user.id, start.date(), end.date())
            .await?;

        Ok(appointments
            .into_iter()
            .filter(|a| {
                let starts_at = a.starts_at();
                starts_at >= start && starts_at <= end
            })
            .collect())
    }
}

/// Lay out `appointments` (already restricted to `period`) on a Sunday-first grid
pub fn build_month_view(period: YearMonth, appointments: Vec<DomainAppointment>) -> MonthView {
    let first_day = period.first_day().weekday().num_days_from_sunday();
    let days_in_month = period.days_in_month();
    debug!("Building calendar for {}: {} days, first weekday {}", period, days_in_month, first_day);

    let mut by_day: HashMap<u32, Vec<DomainAppointment>> = HashMap::new();
    for appointment in appointments {
        if period.contains(appointment.date) {
            by_day.entry(appointment.date.day()).or_default().push(appointment);
        }
    }

    let mut days = Vec::with_capacity((first_day + days_in_month) as usize);
    for _ in 0..first_day {
        days.push(CalendarCell {
            day: 0,
            day_type: CalendarDayType::PaddingBefore,
            appointments: Vec::new(),
        });
    }
    for day in 1..=days_in_month {
        days.push(CalendarCell {
            day,
            day_type: CalendarDayType::MonthDay,
            appointments: by_day.remove(&day).unwrap_or_default(),
        });
    }

    MonthView {
        month: period.month,
        year: period.year,
        month_name: month_name(period.month),
        first_day_of_week: first_day,
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryConnection;
    use chrono::NaiveTime;
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

    fn command(title: &str, date: NaiveDate, time: Option<NaiveTime>) -> CreateAppointmentCommand {
        CreateAppointmentCommand {
            title: title.to_string(),
            description: None,
            date,
            time,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_month_view_padding_and_placement() {
        let service = CalendarService::new(&MemoryConnection::new());
        let ouro = user(PlanTier::Ouro);
        // June 2025 starts on a Sunday, February 2024 on a Thursday
        let june_10 = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        service.create_appointment(&ouro, command("Dentista", june_10, NaiveTime::from_hms_opt(14, 0, 0))).await.unwrap();
        service.create_appointment(&ouro, command("Reunião", june_10, None)).await.unwrap();

        let june = service.month_view(&ouro, 2025, 6).await.unwrap();
        assert_eq!(june.first_day_of_week, 0);
        assert_eq!(june.days.len(), 30);
        assert_eq!(june.month_name, "June");
        let tenth = &june.days[9];
        assert_eq!(tenth.day, 10);
        assert_eq!(tenth.appointments[0].title, "Reunião");
        assert_eq!(tenth.appointments[1].title, "Dentista");

        let february = service.month_view(&ouro, 2024, 2).await.unwrap();
        assert_eq!(february.first_day_of_week, 4);
        assert_eq!(february.days.len(), 4 + 29);
        assert_eq!(february.days[0].day_type, CalendarDayType::PaddingBefore);
        assert_eq!(february.days[4].day, 1);
    }

    #[tokio::test]
    async fn test_invalid_month_is_rejected() {
        let service = CalendarService::new(&MemoryConnection::new());
        let err = service.month_view(&user(PlanTier::Ouro), 2025, 13).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_calendar_is_locked_for_bronze() {
        let service = CalendarService::new(&MemoryConnection::new());
        let today = Utc::now().date_naive();
        let err = service.create_appointment(&user(PlanTier::Bronze), command("Dentista", today, None)).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::FeatureLocked { .. })));
    }

    #[tokio::test]
    async fn test_upcoming_window() {
        let service = CalendarService::new(&MemoryConnection::new());
        let ouro = user(PlanTier::Ouro);
        let now = Utc::now();
        let in_two_hours = now.naive_utc() + Duration::hours(2);
        let in_two_days = now.naive_utc() + Duration::days(2);
        let yesterday = now.naive_utc() - Duration::days(1);

        for (title, at) in [("soon", in_two_hours), ("later", in_two_days), ("past", yesterday)] {
            service.create_appointment(&ouro, command(title, at.date(), Some(at.time()))).await.unwrap();
        }

        let next_day = service.upcoming(&ouro, now, 24).await.unwrap();
        assert_eq!(next_day.len(), 1);
        assert_eq!(next_day[0].title, "soon");

        let week = service.upcoming(&ouro, now, 24 * 7).await.unwrap();
        assert_eq!(week.len(), 2);
        assert!(service.upcoming(&ouro, now, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_untimed_appointment_starts_at_nine() {
        let service = CalendarService::new(&MemoryConnection::new());
        let ouro = user(PlanTier::Ouro);
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        service.create_appointment(&ouro, command("Reunião", day, None)).await.unwrap();

        let early = day.and_hms_opt(7, 0, 0).unwrap().and_utc();
        let upcoming = service.upcoming(&ouro, early, 4).await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].title, "Reunião");

        assert!(service.upcoming(&ouro, early, 1).await.unwrap().is_empty());

        let late = day.and_hms_opt(10, 0, 0).unwrap().and_utc();
        assert!(service.upcoming(&ouro, late, 24).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_appointment() {
        let service = CalendarService::new(&MemoryConnection::new());
        let ouro = user(PlanTier::Ouro);
        let today = Utc::now().date_naive();
        let created = service.create_appointment(&ouro, command("Dentista", today, None)).await.unwrap();

        let updated = service
            .update_appointment(
                &ouro,
                &created.id,
                UpdateAppointmentCommand {
                    time: NaiveTime::from_hms_opt(8, 30, 0),
                    location: Some("Clínica".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.time, NaiveTime::from_hms_opt(8, 30, 0));
        assert_eq!(updated.location.as_deref(), Some("Clínica"));

        service.delete_appointment(&ouro, &created.id).await.unwrap();
        assert!(service.get_appointment(&ouro, &created.id).await.is_err());
    }
}
