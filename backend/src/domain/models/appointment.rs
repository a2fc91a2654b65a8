use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Start time assumed for appointments without an explicit time
pub const DEFAULT_START_HOUR: u32 = 9;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainAppointment {
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

impl DomainAppointment {
    /// Start of the appointment; untimed appointments start at 09:00
    pub fn starts_at(&self) -> NaiveDateTime {
        let time = self
            .time
            .or_else(|| NaiveTime::from_hms_opt(DEFAULT_START_HOUR, 0, 0))
            .unwrap_or_default();
        self.date.and_time(time)
    }
}

/// Calendar ordering: by date, untimed first, then by time
pub fn sort_appointments(appointments: &mut [DomainAppointment]) {
    appointments.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.time.is_some().cmp(&b.time.is_some()))
            .then_with(|| a.time.cmp(&b.time))
            .then_with(|| a.title.cmp(&b.title))
    });
}
