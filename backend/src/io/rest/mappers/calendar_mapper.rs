use shared::{
    Appointment, CalendarDay, CalendarMonth, CreateAppointmentRequest, UpdateAppointmentRequest,
};

use crate::domain::calendar::{CalendarCell, MonthView};
use crate::domain::commands::calendar::{CreateAppointmentCommand, UpdateAppointmentCommand};
use crate::domain::models::DomainAppointment;

pub struct CalendarMapper;

impl CalendarMapper {
    pub fn to_dto(domain: DomainAppointment) -> Appointment {
        Appointment {
            id: domain.id,
            user_id: domain.user_id,
            title: domain.title,
            description: domain.description,
            date: domain.date,
            time: domain.time,
            location: domain.location,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_dto_list(domain: Vec<DomainAppointment>) -> Vec<Appointment> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_month_dto(view: MonthView) -> CalendarMonth {
        CalendarMonth {
            month: view.month,
            year: view.year,
            month_name: view.month_name.to_string(),
            first_day_of_week: view.first_day_of_week,
            days: view.days.into_iter().map(Self::to_day_dto).collect(),
        }
    }

    fn to_day_dto(cell: CalendarCell) -> CalendarDay {
        CalendarDay {
            day: cell.day,
            day_type: cell.day_type,
            appointments: Self::to_dto_list(cell.appointments),
        }
    }

    pub fn to_create_command(request: CreateAppointmentRequest) -> CreateAppointmentCommand {
        CreateAppointmentCommand {
            title: request.title,
            description: request.description,
            date: request.date,
            time: request.time,
            location: request.location,
        }
    }

    pub fn to_update_command(request: UpdateAppointmentRequest) -> UpdateAppointmentCommand {
        UpdateAppointmentCommand {
            title: request.title,
            description: request.description,
            date: request.date,
            time: request.time,
            location: request.location,
        }
    }
}
