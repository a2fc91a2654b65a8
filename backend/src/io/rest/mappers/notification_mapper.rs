use shared::Notification;

use crate::domain::models::DomainNotification;

pub struct NotificationMapper;

impl NotificationMapper {
    pub fn to_dto(domain: DomainNotification) -> Notification {
        Notification {
            id: domain.id,
            user_id: domain.user_id,
            kind: domain.kind,
            title: domain.title,
            message: domain.message,
            reference: domain.reference,
            read: domain.read,
            created_at: domain.created_at,
        }
    }

    pub fn to_dto_list(domain: Vec<DomainNotification>) -> Vec<Notification> {
        domain.into_iter().map(Self::to_dto).collect()
    }
}
